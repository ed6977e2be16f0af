//! Tenant DTOs

use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use core_kernel::UnitId;
use domain_rental::TenantDraft;

#[derive(Debug, Deserialize, Validate)]
pub struct TenantRequest {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub unit_id: Option<UnitId>,
    pub move_in_date: Option<NaiveDate>,
}

impl From<TenantRequest> for TenantDraft {
    fn from(request: TenantRequest) -> Self {
        TenantDraft {
            full_name: request.full_name,
            email: request.email,
            phone: request.phone,
            unit_id: request.unit_id,
            move_in_date: request.move_in_date,
        }
    }
}
