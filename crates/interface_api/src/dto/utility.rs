//! Utility reading DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use core_kernel::{PairingId, PropertyId, UnitId};
use domain_billing::{BillingUnitKey, ExportFormat, UtilityReading, UtilityType};

use crate::error::ApiError;

fn billing_unit(unit_id: Option<UnitId>, pairing_id: Option<PairingId>) -> Result<BillingUnitKey, ApiError> {
    match (unit_id, pairing_id) {
        (None, Some(pairing)) => Ok(BillingUnitKey::Pairing(pairing)),
        (Some(unit), None) => Ok(BillingUnitKey::Unit(unit)),
        _ => Err(ApiError::validation("exactly one of unit_id and pairing_id is required")),
    }
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_reading_owner"))]
pub struct RecordReadingRequest {
    pub unit_id: Option<UnitId>,
    pub pairing_id: Option<PairingId>,
    pub utility_type: UtilityType,
    pub date_of_reading: NaiveDate,
    pub due_date: NaiveDate,
    pub unit_reading: Decimal,
    pub first_floor_reading: Decimal,
    pub second_floor_reading: Decimal,
    pub amount: Decimal,
}

fn validate_reading_owner(request: &RecordReadingRequest) -> Result<(), ValidationError> {
    if request.unit_id.is_some() == request.pairing_id.is_some() {
        let mut error = ValidationError::new("owner");
        error.message = Some("exactly one of unit_id and pairing_id is required".into());
        return Err(error);
    }
    Ok(())
}

impl RecordReadingRequest {
    pub fn billing_unit(&self) -> Result<BillingUnitKey, ApiError> {
        billing_unit(self.unit_id, self.pairing_id)
    }

    pub fn into_reading(self) -> Result<UtilityReading, ApiError> {
        let reading = match self.billing_unit()? {
            BillingUnitKey::Pairing(pairing) => {
                UtilityReading::for_pairing(pairing, self.utility_type, self.date_of_reading, self.due_date)
            }
            BillingUnitKey::Unit(unit) => {
                UtilityReading::for_unit(unit, self.utility_type, self.date_of_reading, self.due_date)
            }
            BillingUnitKey::Unknown => return Err(ApiError::validation("reading has no owner")),
        };
        Ok(reading
            .with_readings(self.unit_reading, self.first_floor_reading, self.second_floor_reading)
            .with_amount(self.amount))
    }
}

/// Selects one billing unit's readings
#[derive(Debug, Deserialize)]
pub struct ReadingsQuery {
    pub unit_id: Option<UnitId>,
    pub pairing_id: Option<PairingId>,
    pub utility_type: Option<UtilityType>,
}

impl ReadingsQuery {
    pub fn billing_unit(&self) -> Result<BillingUnitKey, ApiError> {
        billing_unit(self.unit_id, self.pairing_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct LatestReadingsQuery {
    pub unit_id: Option<UnitId>,
    pub pairing_id: Option<PairingId>,
    pub utility_type: UtilityType,
}

impl LatestReadingsQuery {
    pub fn billing_unit(&self) -> Result<BillingUnitKey, ApiError> {
        billing_unit(self.unit_id, self.pairing_id)
    }
}

/// Billing status of one property's units and pairings
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub property_id: PropertyId,
    pub utility_type: UtilityType,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UtilityPaymentRequest {
    pub paid: bool,
    #[validate(length(max = 1000))]
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BillingQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(unit_id: Option<UnitId>, pairing_id: Option<PairingId>) -> RecordReadingRequest {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        RecordReadingRequest {
            unit_id,
            pairing_id,
            utility_type: UtilityType::WaterUtility,
            date_of_reading: date,
            due_date: date,
            unit_reading: dec!(125),
            first_floor_reading: dec!(80),
            second_floor_reading: dec!(45),
            amount: dec!(1000),
        }
    }

    #[test]
    fn test_reading_needs_exactly_one_owner() {
        assert!(request(Some(UnitId::new()), None).validate().is_ok());
        assert!(request(None, Some(PairingId::new())).validate().is_ok());
        assert!(request(None, None).validate().is_err());
        assert!(request(Some(UnitId::new()), Some(PairingId::new())).validate().is_err());
    }

    #[test]
    fn test_pairing_request_builds_pairing_reading() {
        let pairing = PairingId::new();
        let reading = request(None, Some(pairing)).into_reading().unwrap();
        assert_eq!(reading.pairing_id, Some(pairing));
        assert_eq!(reading.unit_id, None);
        assert_eq!(reading.first_floor_reading, dec!(80));
        assert_eq!(reading.amount, dec!(1000));
    }
}
