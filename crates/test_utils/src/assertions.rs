//! Custom Test Assertions
//!
//! Assertion helpers for domain types that give more meaningful failure
//! messages than plain `assert_eq!`.

use domain_billing::BillingDataForExport;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Tolerance for sums of divided decimals
pub const DECIMAL_TOLERANCE: Decimal = dec!(0.000001);

/// Asserts that a decimal value is within a range
pub fn assert_decimal_in_range(value: Decimal, min: Decimal, max: Decimal) {
    assert!(
        value >= min && value <= max,
        "Decimal {} is not in range [{}, {}]",
        value,
        min,
        max
    );
}

/// Asserts that a decimal value is approximately equal to another
pub fn assert_decimal_approx_eq(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "Decimals differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual,
        expected,
        diff,
        tolerance
    );
}

/// Asserts that a billing record's shares and amounts add up
///
/// With usage, percentages sum to 100 and amounts to the bill. Without
/// usage, every share and amount is zero.
pub fn assert_billing_balanced(billing: &BillingDataForExport) {
    let percentage_sum = billing.first_floor_percentage + billing.second_floor_percentage;
    if billing.total_usage > Decimal::ZERO {
        assert_decimal_approx_eq(percentage_sum, dec!(100), DECIMAL_TOLERANCE);
        assert_decimal_approx_eq(billing.apportioned_total(), billing.amount, DECIMAL_TOLERANCE);
    } else {
        assert_eq!(percentage_sum, Decimal::ZERO, "percentages must be zero without usage");
        assert_eq!(
            billing.apportioned_total(),
            Decimal::ZERO,
            "amounts must be zero without usage"
        );
    }
    assert!(!billing.first_floor_usage.is_sign_negative() || billing.first_floor_usage.is_zero());
    assert!(!billing.second_floor_usage.is_sign_negative() || billing.second_floor_usage.is_zero());
}

/// Asserts that a result is Ok and returns the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Asserts that a result is Err and returns the error
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        match $result {
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => e,
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => panic!("{}: got Ok({:?})", $msg, value),
            Err(e) => e,
        }
    };
}

/// Asserts that an error matches a specific variant
#[macro_export]
macro_rules! assert_err_variant {
    ($result:expr, $pattern:pat) => {
        match $result {
            Ok(value) => panic!("Expected Err matching {}, got Ok({:?})", stringify!($pattern), value),
            Err(ref e) => {
                assert!(
                    matches!(e, $pattern),
                    "Error {:?} does not match pattern {}",
                    e,
                    stringify!($pattern)
                );
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_decimal_approx_eq_passes() {
        assert_decimal_approx_eq(dec!(100.0000001), dec!(100), DECIMAL_TOLERANCE);
    }

    #[test]
    #[should_panic(expected = "differ by more than tolerance")]
    fn test_assert_decimal_approx_eq_fails() {
        assert_decimal_approx_eq(dec!(100.1), dec!(100), DECIMAL_TOLERANCE);
    }

    #[test]
    fn test_assert_decimal_in_range() {
        assert_decimal_in_range(dec!(50), dec!(0), dec!(100));
    }

    #[test]
    fn test_assert_ok_macro() {
        let result: Result<i32, &str> = Ok(42);
        assert_eq!(assert_ok!(result), 42);
    }

    #[test]
    fn test_assert_err_variant_macro() {
        let result: Result<(), Option<i32>> = Err(Some(1));
        assert_err_variant!(result, Some(_));
    }
}
