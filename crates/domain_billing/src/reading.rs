//! Utility meter readings
//!
//! A reading records the state of a water or electricity meter at one date
//! for a billing unit (a single unit, or a pairing of two units sharing a
//! meter). Meter values are cumulative counters that go *down* across a
//! billing period: usage is always the previous value minus the current one.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{PairingId, ReadingId, Record, UnitId, UtilityPaymentId};

use crate::error::BillingError;

/// Billing domain of a reading; domains are never mixed in one computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UtilityType {
    WaterUtility,
    ElectricityUtility,
}

impl UtilityType {
    /// Wire name, identical to the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            UtilityType::WaterUtility => "WaterUtility",
            UtilityType::ElectricityUtility => "ElectricityUtility",
        }
    }

    /// Human readable label for documents
    pub fn label(&self) -> &'static str {
        match self {
            UtilityType::WaterUtility => "Water",
            UtilityType::ElectricityUtility => "Electricity",
        }
    }
}

impl fmt::Display for UtilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UtilityType {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WaterUtility" | "water" | "Water" => Ok(UtilityType::WaterUtility),
            "ElectricityUtility" | "electricity" | "Electricity" => {
                Ok(UtilityType::ElectricityUtility)
            }
            other => Err(BillingError::InvalidReading(format!(
                "unknown utility type '{}'",
                other
            ))),
        }
    }
}

impl From<UtilityType> for serde_json::Value {
    fn from(utility_type: UtilityType) -> Self {
        serde_json::Value::String(utility_type.as_str().to_string())
    }
}

/// Payment state recorded against a utility reading
///
/// Stored in its own collection and joined onto the reading when loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilityPayment {
    pub id: UtilityPaymentId,
    pub reading_id: ReadingId,
    pub paid: bool,
    /// Identity of the user who recorded the payment state
    pub recorded_by_user_id: String,
    pub comments: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl UtilityPayment {
    pub fn new(reading_id: ReadingId, paid: bool, recorded_by_user_id: impl Into<String>) -> Self {
        Self {
            id: UtilityPaymentId::new_v7(),
            reading_id,
            paid,
            recorded_by_user_id: recorded_by_user_id.into(),
            comments: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }
}

impl Record for UtilityPayment {
    type Id = UtilityPaymentId;
    const COLLECTION: &'static str = "utility_payments";
    const ENTITY: &'static str = "UtilityPayment";

    fn record_id(&self) -> UtilityPaymentId {
        self.id
    }
}

/// One meter reading for a billing unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilityReading {
    pub id: ReadingId,
    /// Owning unit, absent when the reading belongs to a pairing only
    pub unit_id: Option<UnitId>,
    /// Pairing of two units billed jointly against one meter
    pub pairing_id: Option<PairingId>,
    pub utility_type: UtilityType,
    pub due_date: NaiveDate,
    /// Ordering key of a reading series
    pub date_of_reading: NaiveDate,
    /// Total meter reading
    pub unit_reading: Decimal,
    pub first_floor_reading: Decimal,
    pub second_floor_reading: Decimal,
    /// Total amount billed for the period
    pub amount: Decimal,
    /// Joined payment record; never persisted with the reading itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<UtilityPayment>,
    pub created_at: DateTime<Utc>,
}

impl UtilityReading {
    fn new(
        unit_id: Option<UnitId>,
        pairing_id: Option<PairingId>,
        utility_type: UtilityType,
        date_of_reading: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: ReadingId::new_v7(),
            unit_id,
            pairing_id,
            utility_type,
            due_date,
            date_of_reading,
            unit_reading: Decimal::ZERO,
            first_floor_reading: Decimal::ZERO,
            second_floor_reading: Decimal::ZERO,
            amount: Decimal::ZERO,
            payment: None,
            created_at: Utc::now(),
        }
    }

    /// Creates a reading for a single unit
    pub fn for_unit(
        unit_id: UnitId,
        utility_type: UtilityType,
        date_of_reading: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self::new(Some(unit_id), None, utility_type, date_of_reading, due_date)
    }

    /// Creates a reading for a pairing of two units sharing a meter
    pub fn for_pairing(
        pairing_id: PairingId,
        utility_type: UtilityType,
        date_of_reading: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self::new(None, Some(pairing_id), utility_type, date_of_reading, due_date)
    }

    /// Sets the total and per-floor meter values
    pub fn with_readings(mut self, unit: Decimal, first_floor: Decimal, second_floor: Decimal) -> Self {
        self.unit_reading = unit;
        self.first_floor_reading = first_floor;
        self.second_floor_reading = second_floor;
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_payment(mut self, payment: UtilityPayment) -> Self {
        self.payment = Some(payment);
        self
    }

    /// True only when a payment record exists and marks the reading paid
    pub fn is_paid(&self) -> bool {
        self.payment.as_ref().is_some_and(|p| p.paid)
    }

    /// Copy of the reading without its joined payment, as persisted
    pub fn without_payment(&self) -> Self {
        Self {
            payment: None,
            ..self.clone()
        }
    }

    /// Checks the invariants enforced when a reading is recorded
    ///
    /// Meter values and amounts must not be negative, and the reading must
    /// belong to a unit or a pairing.
    pub fn validate(&self) -> Result<(), BillingError> {
        if self.unit_id.is_none() && self.pairing_id.is_none() {
            return Err(BillingError::InvalidReading(
                "reading must reference a unit or a pairing".to_string(),
            ));
        }

        let fields = [
            ("unit_reading", self.unit_reading),
            ("first_floor_reading", self.first_floor_reading),
            ("second_floor_reading", self.second_floor_reading),
            ("amount", self.amount),
        ];
        for (name, value) in fields {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(BillingError::InvalidReading(format!(
                    "{} must not be negative (got {})",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

impl Record for UtilityReading {
    type Id = ReadingId;
    const COLLECTION: &'static str = "utility_readings";
    const ENTITY: &'static str = "UtilityReading";

    fn record_id(&self) -> ReadingId {
        self.id
    }
}
