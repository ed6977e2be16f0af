//! Test Data Builders
//!
//! Builders with sensible defaults so tests only spell out the fields they
//! care about.

use chrono::NaiveDate;
use core_kernel::{PairingId, ReadingId, TenantId, UnitId};
use domain_billing::{UtilityPayment, UtilityReading, UtilityType};
use domain_rental::ContractDraft;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::DateFixtures;

/// Builder for utility readings
pub struct UtilityReadingBuilder {
    id: Option<ReadingId>,
    unit_id: Option<UnitId>,
    pairing_id: Option<PairingId>,
    utility_type: UtilityType,
    date_of_reading: NaiveDate,
    due_date: NaiveDate,
    first_floor: Decimal,
    second_floor: Decimal,
    amount: Decimal,
    paid: Option<bool>,
}

impl Default for UtilityReadingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UtilityReadingBuilder {
    /// Water reading of a fresh unit on June 1, 2024
    pub fn new() -> Self {
        Self {
            id: None,
            unit_id: Some(UnitId::new()),
            pairing_id: None,
            utility_type: UtilityType::WaterUtility,
            date_of_reading: DateFixtures::june_reading(),
            due_date: DateFixtures::july_due_date(),
            first_floor: dec!(0),
            second_floor: dec!(0),
            amount: dec!(0),
            paid: None,
        }
    }

    pub fn with_id(mut self, id: ReadingId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn for_unit(mut self, unit_id: UnitId) -> Self {
        self.unit_id = Some(unit_id);
        self.pairing_id = None;
        self
    }

    pub fn for_pairing(mut self, pairing_id: PairingId) -> Self {
        self.unit_id = None;
        self.pairing_id = Some(pairing_id);
        self
    }

    pub fn electricity(mut self) -> Self {
        self.utility_type = UtilityType::ElectricityUtility;
        self
    }

    pub fn with_type(mut self, utility_type: UtilityType) -> Self {
        self.utility_type = utility_type;
        self
    }

    pub fn on(mut self, date_of_reading: NaiveDate) -> Self {
        self.date_of_reading = date_of_reading;
        self
    }

    pub fn due(mut self, due_date: NaiveDate) -> Self {
        self.due_date = due_date;
        self
    }

    /// Sets both sub-meter values; the unit reading becomes their sum
    pub fn floors(mut self, first_floor: Decimal, second_floor: Decimal) -> Self {
        self.first_floor = first_floor;
        self.second_floor = second_floor;
        self
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    pub fn paid(mut self, paid: bool) -> Self {
        self.paid = Some(paid);
        self
    }

    pub fn build(self) -> UtilityReading {
        let mut reading = match (self.pairing_id, self.unit_id) {
            (Some(pairing_id), _) => {
                UtilityReading::for_pairing(pairing_id, self.utility_type, self.date_of_reading, self.due_date)
            }
            (None, unit_id) => {
                let mut reading = UtilityReading::for_unit(
                    UnitId::new(),
                    self.utility_type,
                    self.date_of_reading,
                    self.due_date,
                );
                reading.unit_id = unit_id;
                reading
            }
        };
        if let Some(id) = self.id {
            reading.id = id;
        }
        reading = reading
            .with_readings(
                self.first_floor.saturating_add(self.second_floor),
                self.first_floor,
                self.second_floor,
            )
            .with_amount(self.amount);
        if let Some(paid) = self.paid {
            let reading_id = reading.id;
            reading = reading.with_payment(UtilityPayment::new(reading_id, paid, "test-user"));
        }
        reading
    }
}

/// Builder for contract drafts
pub struct ContractDraftBuilder {
    draft: ContractDraft,
}

impl ContractDraftBuilder {
    /// One-year lease starting January 1, 2024
    pub fn new(tenant_id: TenantId, unit_id: UnitId) -> Self {
        Self {
            draft: ContractDraft {
                tenant_id,
                unit_id,
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                monthly_rent: None,
                deposit: dec!(0),
            },
        }
    }

    pub fn term(mut self, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        self.draft.start_date = start_date;
        self.draft.end_date = end_date;
        self
    }

    pub fn monthly_rent(mut self, rent: Decimal) -> Self {
        self.draft.monthly_rent = Some(rent);
        self
    }

    pub fn deposit(mut self, deposit: Decimal) -> Self {
        self.draft.deposit = deposit;
        self
    }

    pub fn build(self) -> ContractDraft {
        self.draft
    }
}
