//! Number and currency formatting for billing documents
//!
//! The calculator keeps full precision; values are rounded to two decimals
//! only when rendered through these helpers.

use rust_decimal::{Decimal, RoundingStrategy};

use core_kernel::Currency;

/// Decimal places used on billing documents
pub const DOCUMENT_DECIMAL_PLACES: u32 = 2;

/// Rounds half away from zero, as printed invoices expect
pub fn round_for_display(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats `value` with `dp` decimals and comma-grouped thousands
///
/// `1234567.891` with 2 decimals becomes `"1,234,567.89"`.
pub fn format_number(value: Decimal, dp: u32) -> String {
    let rounded = round_for_display(value, dp);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = format!("{:.*}", dp as usize, rounded.abs());

    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(digits.len() + integer.len() / 3 + 1);
    if negative {
        grouped.push('-');
    }
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

/// Formats a monetary amount, e.g. `"₱1,250.00"`
pub fn format_currency(value: Decimal, currency: Currency) -> String {
    let rounded = round_for_display(value, currency.decimal_places());
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!(
        "{}{}{}",
        sign,
        currency.symbol(),
        format_number(rounded.abs(), currency.decimal_places())
    )
}

/// Formats a percentage with two decimals, e.g. `"80.00%"`
pub fn format_percentage(value: Decimal) -> String {
    format!("{}%", format_number(value, DOCUMENT_DECIMAL_PLACES))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_number_groups_thousands() {
        assert_eq!(format_number(dec!(1234567.891), 2), "1,234,567.89");
        assert_eq!(format_number(dec!(999), 2), "999.00");
        assert_eq!(format_number(dec!(1000), 0), "1,000");
        assert_eq!(format_number(dec!(0), 2), "0.00");
    }

    #[test]
    fn test_format_number_rounds_half_away_from_zero() {
        assert_eq!(format_number(dec!(2.345), 2), "2.35");
        assert_eq!(format_number(dec!(-2.345), 2), "-2.35");
    }

    #[test]
    fn test_format_number_negative_zero_has_no_sign() {
        assert_eq!(format_number(dec!(-0.001), 2), "0.00");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(dec!(1250), Currency::PHP), "₱1,250.00");
        assert_eq!(format_currency(dec!(-75.5), Currency::USD), "-$75.50");
        assert_eq!(format_currency(dec!(10000.4), Currency::JPY), "¥10,000");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(dec!(80)), "80.00%");
        assert_eq!(format_percentage(dec!(33.33333333)), "33.33%");
    }
}
