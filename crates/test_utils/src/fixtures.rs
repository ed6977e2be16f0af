//! Pre-built Test Fixtures
//!
//! Ready-to-use, predictable test data for readings, users and stores.

use std::sync::Arc;

use chrono::NaiveDate;
use core_kernel::{AccountId, InMemoryRecordStore, RecordStore, UnitId};
use domain_billing::{UtilityReading, UtilityType};
use domain_rental::{CurrentUser, Role};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for reading dates
pub struct DateFixtures;

impl DateFixtures {
    /// Start-of-period reading date (June 1, 2024)
    pub fn june_reading() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    /// End-of-period reading date (July 1, 2024)
    pub fn july_reading() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
    }

    /// Due date of the July bill
    pub fn july_due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()
    }

    /// `n` days after June 1, 2024
    pub fn day(n: u64) -> NaiveDate {
        Self::june_reading() + chrono::Days::new(n)
    }
}

/// Fixture for authenticated users
pub struct UserFixtures;

impl UserFixtures {
    pub fn manager(account_id: AccountId) -> CurrentUser {
        CurrentUser::new("user-manager", "Maria Santos", Role::Manager, account_id)
    }

    pub fn contributor(account_id: AccountId) -> CurrentUser {
        CurrentUser::new("user-staff", "Jose Rizal", Role::Contributor, account_id)
    }
}

/// Fixture for the canonical two-floor water scenario
///
/// Previous 100/50, current 80/45, bill 1000: usage 20/5, shares 80/20,
/// amounts 800/200.
pub struct ReadingFixtures;

impl ReadingFixtures {
    pub fn previous_water(unit_id: UnitId) -> UtilityReading {
        Self::water(unit_id, DateFixtures::june_reading(), dec!(100), dec!(50), dec!(900))
    }

    pub fn current_water(unit_id: UnitId) -> UtilityReading {
        Self::water(unit_id, DateFixtures::july_reading(), dec!(80), dec!(45), dec!(1000))
    }

    pub fn water(
        unit_id: UnitId,
        date_of_reading: NaiveDate,
        first_floor: Decimal,
        second_floor: Decimal,
        amount: Decimal,
    ) -> UtilityReading {
        UtilityReading::for_unit(
            unit_id,
            UtilityType::WaterUtility,
            date_of_reading,
            DateFixtures::july_due_date(),
        )
        .with_readings(first_floor + second_floor, first_floor, second_floor)
        .with_amount(amount)
    }
}

/// Fresh in-memory store behind the store trait
pub fn memory_store() -> Arc<dyn RecordStore> {
    Arc::new(InMemoryRecordStore::new())
}
