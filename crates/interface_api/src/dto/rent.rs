//! Rent payment DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use core_kernel::{ContractId, TenantId};
use domain_rental::{RentPaymentDraft, RentPeriod};

use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct RecordRentPaymentRequest {
    pub contract_id: ContractId,
    /// Month as `YYYY-MM`
    #[validate(length(equal = 7))]
    pub period: String,
    pub paid: bool,
    pub paid_on: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    #[validate(length(max = 1000))]
    pub comments: Option<String>,
}

impl TryFrom<RecordRentPaymentRequest> for RentPaymentDraft {
    type Error = ApiError;

    fn try_from(request: RecordRentPaymentRequest) -> Result<Self, Self::Error> {
        let period: RentPeriod = request
            .period
            .parse()
            .map_err(|_| ApiError::validation(format!("invalid period '{}'", request.period)))?;
        Ok(RentPaymentDraft {
            contract_id: request.contract_id,
            period,
            paid: request.paid,
            paid_on: request.paid_on,
            amount: request.amount,
            comments: request.comments,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SetPaidRequest {
    pub paid: bool,
    /// Defaults to today when `paid` is set
    pub paid_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct RentPaymentsQuery {
    pub tenant_id: TenantId,
}
