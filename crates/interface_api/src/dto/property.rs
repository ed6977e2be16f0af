//! Property, unit and pairing DTOs

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use core_kernel::UnitId;
use domain_rental::{PropertyDraft, UnitDraft};

#[derive(Debug, Deserialize, Validate)]
pub struct PropertyRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub address: String,
}

impl From<PropertyRequest> for PropertyDraft {
    fn from(request: PropertyRequest) -> Self {
        PropertyDraft::new(request.name, request.address)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UnitRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub monthly_rent: Decimal,
}

impl From<UnitRequest> for UnitDraft {
    fn from(request: UnitRequest) -> Self {
        UnitDraft::new(request.name, request.monthly_rent)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePairingRequest {
    pub first_unit_id: UnitId,
    pub second_unit_id: UnitId,
    /// Defaults to "<first> & <second>"
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
}
