//! Lease document data
//!
//! Assembled from a contract and the records it references, then handed to an
//! external document writer. Like the billing export record it is built on
//! demand and never stored.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ContractId, Money};

use crate::contract::{Contract, ContractStatus};
use crate::error::RentalError;
use crate::property::Property;
use crate::tenant::Tenant;
use crate::unit::Unit;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseDocumentData {
    pub contract_id: ContractId,
    pub property_name: String,
    pub property_address: String,
    pub unit_name: String,
    pub tenant_name: String,
    pub tenant_email: Option<String>,
    pub tenant_phone: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub term_months: usize,
    pub monthly_rent: Money,
    pub deposit: Money,
    pub status: ContractStatus,
    pub signed_at: Option<DateTime<Utc>>,
    pub notarized_at: Option<DateTime<Utc>>,
    pub prepared_by: String,
    pub generated_at: DateTime<Utc>,
}

impl LeaseDocumentData {
    /// Combines the records referenced by `contract`
    ///
    /// Fails with `Validation` if the tenant, unit or property is not the one
    /// the contract points at.
    pub fn assemble(
        contract: &Contract,
        tenant: &Tenant,
        unit: &Unit,
        property: &Property,
        prepared_by: &str,
    ) -> Result<Self, RentalError> {
        if contract.tenant_id != tenant.id || contract.unit_id != unit.id || unit.property_id != property.id {
            return Err(RentalError::validation(format!(
                "records do not belong to contract {}",
                contract.id
            )));
        }
        if contract.status == ContractStatus::Terminated {
            return Err(RentalError::conflict(format!(
                "contract {} is terminated",
                contract.id
            )));
        }

        Ok(Self {
            contract_id: contract.id,
            property_name: property.name.clone(),
            property_address: property.address.clone(),
            unit_name: unit.name.clone(),
            tenant_name: tenant.full_name.clone(),
            tenant_email: tenant.email.clone(),
            tenant_phone: tenant.phone.clone(),
            start_date: contract.start_date,
            end_date: contract.end_date,
            term_months: contract.term_months(),
            monthly_rent: contract.monthly_rent,
            deposit: contract.deposit,
            status: contract.status,
            signed_at: contract.signed_at,
            notarized_at: contract.notarized_at,
            prepared_by: prepared_by.to_string(),
            generated_at: Utc::now(),
        })
    }
}
