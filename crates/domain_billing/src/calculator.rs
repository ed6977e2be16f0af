//! Billing apportionment
//!
//! Turns a resolved (previous, current) reading pair into a
//! [`BillingDataForExport`]: per-floor usage, each floor's share of the total
//! usage, and the current bill amount split by those shares.
//!
//! # Rules
//!
//! - `usage = max(previous - current, 0)` per floor. Meters count down, and a
//!   negative difference means reversed or corrected readings upstream; it is
//!   clamped (and logged) rather than allowed to poison the percentages.
//! - With zero total usage both percentages and both amounts are zero, even
//!   when the bill itself is not: there is no evidence to attribute it.
//! - No rounding happens here. Two-decimal rounding is a presentation concern.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use core_kernel::ReadingId;

use crate::reading::{UtilityReading, UtilityType};
use crate::resolver::ResolvedPair;

/// Payment remark printed on a billing document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentRemark {
    #[serde(rename = "Paid")]
    Paid,
    #[serde(rename = "Not Paid")]
    NotPaid,
}

impl PaymentRemark {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentRemark::Paid => "Paid",
            PaymentRemark::NotPaid => "Not Paid",
        }
    }
}

impl fmt::Display for PaymentRemark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully apportioned billing record handed to document exporters
///
/// Built fresh for every export and never persisted. Field names serialize in
/// camelCase (`firstFloorUsage`, `secondFloorAmount`, ...) so exporters stay
/// interchangeable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingDataForExport {
    pub unit_name: String,
    pub utility_type: UtilityType,
    pub reading_id: ReadingId,
    pub previous_reading_id: ReadingId,
    pub due_date: NaiveDate,
    pub previous_date_of_reading: NaiveDate,
    pub current_date_of_reading: NaiveDate,
    pub previous_unit_reading: Decimal,
    pub current_unit_reading: Decimal,
    pub previous_first_floor_reading: Decimal,
    pub current_first_floor_reading: Decimal,
    pub previous_second_floor_reading: Decimal,
    pub current_second_floor_reading: Decimal,
    pub first_floor_usage: Decimal,
    pub second_floor_usage: Decimal,
    pub total_usage: Decimal,
    pub first_floor_percentage: Decimal,
    pub second_floor_percentage: Decimal,
    /// Total bill of the current period
    pub amount: Decimal,
    pub first_floor_amount: Decimal,
    pub second_floor_amount: Decimal,
    pub remarks: PaymentRemark,
    pub prepared_by: String,
}

impl BillingDataForExport {
    /// Apportions a resolved pair; see [`calculate_billing`]
    pub fn from_pair(pair: ResolvedPair<'_>, unit_name: &str, prepared_by: &str) -> Self {
        calculate_billing(pair.previous, pair.current, unit_name, prepared_by)
    }

    /// Sum of the apportioned amounts
    pub fn apportioned_total(&self) -> Decimal {
        self.first_floor_amount.saturating_add(self.second_floor_amount)
    }
}

/// Usage of one sub-location, clamped at zero
pub fn sub_location_usage(previous: Decimal, current: Decimal) -> Decimal {
    let usage = previous.saturating_sub(current);
    if usage.is_sign_negative() && !usage.is_zero() {
        warn!(
            %previous,
            %current,
            "Current reading exceeds previous reading; clamping usage to zero"
        );
        Decimal::ZERO
    } else {
        usage
    }
}

/// Share of `usage` in `total` as a fraction; zero when `total` is zero
fn usage_share(usage: Decimal, total: Decimal) -> Decimal {
    if total > Decimal::ZERO {
        usage / total
    } else {
        Decimal::ZERO
    }
}

/// Share of `usage` in `total`, in percent; zero when `total` is zero
pub fn usage_percentage(usage: Decimal, total: Decimal) -> Decimal {
    usage_share(usage, total) * dec!(100)
}

/// Part of `amount` owed for `usage` out of `total`
///
/// The share is at most one, so the result never exceeds `amount`.
pub fn apportion(amount: Decimal, usage: Decimal, total: Decimal) -> Decimal {
    amount * usage_share(usage, total)
}

/// Computes the export record for `current` billed against `previous`
///
/// Pure: identical inputs give identical output, and no input combination of
/// numeric readings makes it fail.
pub fn calculate_billing(
    previous: &UtilityReading,
    current: &UtilityReading,
    unit_name: &str,
    prepared_by: &str,
) -> BillingDataForExport {
    let first_floor_usage =
        sub_location_usage(previous.first_floor_reading, current.first_floor_reading);
    let second_floor_usage =
        sub_location_usage(previous.second_floor_reading, current.second_floor_reading);
    let total_usage = first_floor_usage.saturating_add(second_floor_usage);
    if total_usage == Decimal::MAX {
        warn!(%first_floor_usage, %second_floor_usage, "Total usage saturated");
    }

    let first_floor_percentage = usage_percentage(first_floor_usage, total_usage);
    let second_floor_percentage = usage_percentage(second_floor_usage, total_usage);

    let first_floor_amount = apportion(current.amount, first_floor_usage, total_usage);
    let second_floor_amount = apportion(current.amount, second_floor_usage, total_usage);

    let remarks = if current.is_paid() {
        PaymentRemark::Paid
    } else {
        PaymentRemark::NotPaid
    };

    BillingDataForExport {
        unit_name: unit_name.to_string(),
        utility_type: current.utility_type,
        reading_id: current.id,
        previous_reading_id: previous.id,
        due_date: current.due_date,
        previous_date_of_reading: previous.date_of_reading,
        current_date_of_reading: current.date_of_reading,
        previous_unit_reading: previous.unit_reading,
        current_unit_reading: current.unit_reading,
        previous_first_floor_reading: previous.first_floor_reading,
        current_first_floor_reading: current.first_floor_reading,
        previous_second_floor_reading: previous.second_floor_reading,
        current_second_floor_reading: current.second_floor_reading,
        first_floor_usage,
        second_floor_usage,
        total_usage,
        first_floor_percentage,
        second_floor_percentage,
        amount: current.amount,
        first_floor_amount,
        second_floor_amount,
        remarks,
        prepared_by: prepared_by.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::UnitId;
    use crate::reading::UtilityPayment;

    fn reading(day: u32, first: Decimal, second: Decimal, amount: Decimal) -> UtilityReading {
        let date = NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
        UtilityReading::for_unit(UnitId::new(), UtilityType::WaterUtility, date, date)
            .with_readings(first + second, first, second)
            .with_amount(amount)
    }

    #[test]
    fn test_two_floor_water_scenario() {
        let previous = reading(1, dec!(100), dec!(50), dec!(900));
        let current = reading(31, dec!(80), dec!(45), dec!(1000));

        let billing = calculate_billing(&previous, &current, "Unit 3A", "Maria Santos");

        assert_eq!(billing.first_floor_usage, dec!(20));
        assert_eq!(billing.second_floor_usage, dec!(5));
        assert_eq!(billing.total_usage, dec!(25));
        assert_eq!(billing.first_floor_percentage, dec!(80));
        assert_eq!(billing.second_floor_percentage, dec!(20));
        assert_eq!(billing.first_floor_amount, dec!(800));
        assert_eq!(billing.second_floor_amount, dec!(200));
        assert_eq!(billing.amount, dec!(1000));
        assert_eq!(billing.unit_name, "Unit 3A");
        assert_eq!(billing.prepared_by, "Maria Santos");
    }

    #[test]
    fn test_no_consumption_apportions_nothing() {
        let previous = reading(1, dec!(70), dec!(30), dec!(500));
        let current = reading(31, dec!(70), dec!(30), dec!(500));

        let billing = calculate_billing(&previous, &current, "Unit 1", "admin");

        assert_eq!(billing.total_usage, Decimal::ZERO);
        assert_eq!(billing.first_floor_percentage, Decimal::ZERO);
        assert_eq!(billing.second_floor_percentage, Decimal::ZERO);
        assert_eq!(billing.first_floor_amount, Decimal::ZERO);
        assert_eq!(billing.second_floor_amount, Decimal::ZERO);
        assert_eq!(billing.amount, dec!(500));
    }

    #[test]
    fn test_reversed_readings_are_clamped() {
        let previous = reading(1, dec!(50), dec!(10), dec!(0));
        let current = reading(31, dec!(80), dec!(4), dec!(300));

        let billing = calculate_billing(&previous, &current, "Unit 1", "admin");

        assert_eq!(billing.first_floor_usage, Decimal::ZERO);
        assert_eq!(billing.second_floor_usage, dec!(6));
        assert_eq!(billing.second_floor_percentage, dec!(100));
        assert_eq!(billing.second_floor_amount, dec!(300));
        assert_eq!(billing.first_floor_amount, Decimal::ZERO);
    }

    #[test]
    fn test_remarks_follow_current_payment() {
        let previous = reading(1, dec!(10), dec!(10), dec!(0))
            .with_payment(UtilityPayment::new(ReadingId::new(), true, "u"));
        let current = reading(31, dec!(5), dec!(5), dec!(100));

        let unpaid = calculate_billing(&previous, &current, "U", "P");
        assert_eq!(unpaid.remarks, PaymentRemark::NotPaid);

        let paid_current = current.clone().with_payment(UtilityPayment::new(current.id, true, "u"));
        let paid = calculate_billing(&previous, &paid_current, "U", "P");
        assert_eq!(paid.remarks, PaymentRemark::Paid);
    }

    #[test]
    fn test_calculation_is_idempotent() {
        let previous = reading(1, dec!(123.45), dec!(67.8), dec!(0));
        let current = reading(31, dec!(100.05), dec!(60.1), dec!(1234.56));

        let first = calculate_billing(&previous, &current, "U", "P");
        let second = calculate_billing(&previous, &current, "U", "P");
        assert_eq!(first, second);
    }

    #[test]
    fn test_field_names_are_camel_case() {
        let previous = reading(1, dec!(100), dec!(50), dec!(0));
        let current = reading(31, dec!(80), dec!(45), dec!(1000));
        let json = serde_json::to_value(calculate_billing(&previous, &current, "U", "P")).unwrap();

        assert!(json.get("firstFloorUsage").is_some());
        assert!(json.get("secondFloorAmount").is_some());
        assert!(json.get("preparedBy").is_some());
        assert_eq!(json["remarks"], "Not Paid");
    }

    #[test]
    fn test_amount_near_decimal_limit_is_apportioned() {
        let previous = reading(1, dec!(10), dec!(0), dec!(0));
        let amount = Decimal::from_i128_with_scale(10i128.pow(27), 0);
        let current = reading(31, dec!(0), dec!(0), amount);

        let billing = calculate_billing(&previous, &current, "U", "P");

        assert_eq!(billing.first_floor_percentage, dec!(100));
        assert_eq!(billing.first_floor_amount, amount);
        assert_eq!(billing.second_floor_amount, Decimal::ZERO);
    }

    #[test]
    fn test_extreme_readings_saturate() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let previous = UtilityReading::for_unit(UnitId::new(), UtilityType::WaterUtility, date, date)
            .with_readings(Decimal::ZERO, Decimal::MAX, Decimal::MAX);
        let current = UtilityReading::for_unit(UnitId::new(), UtilityType::WaterUtility, date, date)
            .with_readings(Decimal::ZERO, Decimal::MIN, Decimal::ZERO)
            .with_amount(Decimal::MAX);

        let billing = calculate_billing(&previous, &current, "U", "P");

        assert_eq!(billing.first_floor_usage, Decimal::MAX);
        assert_eq!(billing.total_usage, Decimal::MAX);
        assert!(billing.first_floor_amount <= Decimal::MAX);
        assert!(billing.second_floor_amount <= billing.amount);
        assert_eq!(billing.apportioned_total(), Decimal::MAX);
    }

    #[test]
    fn test_apportion_never_exceeds_amount() {
        assert_eq!(apportion(dec!(1000), dec!(20), dec!(25)), dec!(800));
        assert_eq!(apportion(dec!(1000), dec!(0), dec!(0)), Decimal::ZERO);
        assert_eq!(apportion(Decimal::MAX, dec!(1), dec!(1)), Decimal::MAX);
    }

    #[test]
    fn test_usage_percentage_zero_total() {
        assert_eq!(usage_percentage(dec!(0), dec!(0)), Decimal::ZERO);
        assert_eq!(usage_percentage(dec!(1), dec!(4)), dec!(25));
    }
}
