//! Contract DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use core_kernel::{ContractId, TenantId, UnitId};
use domain_rental::{ContractDraft, RentPeriod};

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_term"))]
pub struct CreateContractRequest {
    pub tenant_id: TenantId,
    pub unit_id: UnitId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Defaults to the unit's monthly rent
    pub monthly_rent: Option<Decimal>,
    #[serde(default)]
    pub deposit: Decimal,
}

fn validate_term(request: &CreateContractRequest) -> Result<(), ValidationError> {
    if request.start_date >= request.end_date {
        let mut error = ValidationError::new("term");
        error.message = Some("start_date must be before end_date".into());
        return Err(error);
    }
    Ok(())
}

impl From<CreateContractRequest> for ContractDraft {
    fn from(request: CreateContractRequest) -> Self {
        ContractDraft {
            tenant_id: request.tenant_id,
            unit_id: request.unit_id,
            start_date: request.start_date,
            end_date: request.end_date,
            monthly_rent: request.monthly_rent,
            deposit: request.deposit,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct TerminateContractRequest {
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OutstandingRentQuery {
    /// Defaults to today
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct OutstandingRentResponse {
    pub contract_id: ContractId,
    pub as_of: NaiveDate,
    /// Unpaid months as `YYYY-MM`
    pub periods: Vec<String>,
}

impl OutstandingRentResponse {
    pub fn new(contract_id: ContractId, as_of: NaiveDate, periods: &[RentPeriod]) -> Self {
        Self {
            contract_id,
            as_of,
            periods: periods.iter().map(RentPeriod::to_string).collect(),
        }
    }
}
