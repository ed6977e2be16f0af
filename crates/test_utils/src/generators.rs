//! Property-Based Test Generators
//!
//! Proptest strategies for meter values, reading pairs and reading series.

use chrono::{Days, NaiveDate};
use core_kernel::UnitId;
use domain_billing::{UtilityReading, UtilityType};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::builders::UtilityReadingBuilder;
use crate::fixtures::DateFixtures;

/// Strategy for utility types
pub fn utility_type_strategy() -> impl Strategy<Value = UtilityType> {
    prop_oneof![
        Just(UtilityType::WaterUtility),
        Just(UtilityType::ElectricityUtility),
    ]
}

/// Strategy for meter values with two decimals, 0.00 to 99,999.99
pub fn meter_value_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for bill amounts with two decimals, 0.00 to 999,999.99
pub fn bill_amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for a reading date within 2024
pub fn reading_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..366u64).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Days::new(offset)
    })
}

/// Strategy for a (previous, current) pair of one unit
///
/// Meter values are independent, so current values may exceed previous
/// ones and exercise clamping.
pub fn reading_pair_strategy() -> impl Strategy<Value = (UtilityReading, UtilityReading)> {
    (
        utility_type_strategy(),
        meter_value_strategy(),
        meter_value_strategy(),
        meter_value_strategy(),
        meter_value_strategy(),
        bill_amount_strategy(),
        any::<bool>(),
    )
        .prop_map(|(utility_type, prev_first, prev_second, cur_first, cur_second, amount, paid)| {
            let unit_id = UnitId::new();
            let previous = UtilityReadingBuilder::new()
                .for_unit(unit_id)
                .with_type(utility_type)
                .on(DateFixtures::june_reading())
                .floors(prev_first, prev_second)
                .build();
            let current = UtilityReadingBuilder::new()
                .for_unit(unit_id)
                .with_type(utility_type)
                .on(DateFixtures::july_reading())
                .floors(cur_first, cur_second)
                .amount(amount)
                .paid(paid)
                .build();
            (previous, current)
        })
}

/// Strategy for readings of one unit with random, possibly repeated dates
pub fn reading_series_strategy(max_len: usize) -> impl Strategy<Value = Vec<UtilityReading>> {
    let unit_id = UnitId::new();
    prop::collection::vec(
        (reading_date_strategy(), utility_type_strategy(), meter_value_strategy()),
        0..=max_len,
    )
    .prop_map(move |entries| {
        entries
            .into_iter()
            .map(|(date, utility_type, value)| {
                UtilityReadingBuilder::new()
                    .for_unit(unit_id)
                    .with_type(utility_type)
                    .on(date)
                    .floors(value, value)
                    .build()
            })
            .collect()
    })
}
