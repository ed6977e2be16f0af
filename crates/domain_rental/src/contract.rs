//! Lease contracts and their lifecycle
//!
//! ```text
//! Draft ──sign──▶ Signed ──notarize──▶ Notarized
//!   │               │                     │
//!   └───────────────┴──────terminate──────┴──▶ Terminated
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{AccountId, ContractId, Money, Record, TenantId, UnitId};

use crate::access::AccountScoped;
use crate::error::RentalError;
use crate::rent::RentPeriod;
use crate::unit::Unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Draft,
    Signed,
    Notarized,
    Terminated,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Draft => "draft",
            ContractStatus::Signed => "signed",
            ContractStatus::Notarized => "notarized",
            ContractStatus::Terminated => "terminated",
        }
    }

    pub fn can_transition_to(&self, next: ContractStatus) -> bool {
        use ContractStatus::*;
        matches!(
            (*self, next),
            (Draft, Signed) | (Signed, Notarized) | (Draft | Signed | Notarized, Terminated)
        )
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied fields of a contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDraft {
    pub tenant_id: TenantId,
    pub unit_id: UnitId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Defaults to the unit's monthly rent
    pub monthly_rent: Option<Decimal>,
    pub deposit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub account_id: AccountId,
    pub tenant_id: TenantId,
    pub unit_id: UnitId,
    pub start_date: NaiveDate,
    /// Exclusive end of the lease term
    pub end_date: NaiveDate,
    pub monthly_rent: Money,
    pub deposit: Money,
    pub status: ContractStatus,
    pub signed_at: Option<DateTime<Utc>>,
    pub notarized_at: Option<DateTime<Utc>>,
    pub terminated_at: Option<DateTime<Utc>>,
    pub termination_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    /// Creates a draft contract for `unit`
    pub fn new(draft: ContractDraft, unit: &Unit) -> Result<Self, RentalError> {
        if draft.unit_id != unit.id {
            return Err(RentalError::validation("contract unit does not match"));
        }
        if draft.start_date >= draft.end_date {
            return Err(RentalError::validation(
                "contract start date must be before its end date",
            ));
        }
        if draft.deposit.is_sign_negative() || draft.monthly_rent.is_some_and(|r| r.is_sign_negative()) {
            return Err(RentalError::validation("contract amounts must not be negative"));
        }

        let currency = unit.monthly_rent.currency();
        let monthly_rent = draft
            .monthly_rent
            .map(|rent| Money::new(rent, currency))
            .unwrap_or(unit.monthly_rent);
        let now = Utc::now();

        Ok(Self {
            id: ContractId::new_v7(),
            account_id: unit.account_id,
            tenant_id: draft.tenant_id,
            unit_id: unit.id,
            start_date: draft.start_date,
            end_date: draft.end_date,
            monthly_rent,
            deposit: Money::new(draft.deposit, currency),
            status: ContractStatus::Draft,
            signed_at: None,
            notarized_at: None,
            terminated_at: None,
            termination_reason: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn transition(&mut self, next: ContractStatus) -> Result<DateTime<Utc>, RentalError> {
        if !self.status.can_transition_to(next) {
            return Err(RentalError::invalid_transition(self.status, next));
        }
        let now = Utc::now();
        self.status = next;
        self.updated_at = now;
        Ok(now)
    }

    pub fn sign(&mut self) -> Result<(), RentalError> {
        let at = self.transition(ContractStatus::Signed)?;
        self.signed_at = Some(at);
        Ok(())
    }

    /// Records notarization; only signed contracts can be notarized
    pub fn notarize(&mut self) -> Result<(), RentalError> {
        let at = self.transition(ContractStatus::Notarized)?;
        self.notarized_at = Some(at);
        Ok(())
    }

    pub fn terminate(&mut self, reason: Option<String>) -> Result<(), RentalError> {
        let at = self.transition(ContractStatus::Terminated)?;
        self.terminated_at = Some(at);
        self.termination_reason = reason;
        Ok(())
    }

    pub fn is_signed(&self) -> bool {
        self.signed_at.is_some()
    }

    pub fn is_notarized(&self) -> bool {
        self.notarized_at.is_some()
    }

    /// Calendar months covered by the lease term
    pub fn periods(&self) -> Vec<RentPeriod> {
        RentPeriod::range(
            RentPeriod::of(self.start_date),
            RentPeriod::last_before(self.end_date),
        )
    }

    pub fn term_months(&self) -> usize {
        self.periods().len()
    }
}

impl Record for Contract {
    type Id = ContractId;
    const COLLECTION: &'static str = "contracts";
    const ENTITY: &'static str = "Contract";

    fn record_id(&self) -> ContractId {
        self.id
    }
}

impl AccountScoped for Contract {
    fn account_id(&self) -> AccountId {
        self.account_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Currency, PropertyId};
    use rust_decimal_macros::dec;

    use crate::unit::UnitDraft;

    fn unit() -> Unit {
        Unit::new(PropertyId::new(), AccountId::new(), UnitDraft::new("3A", dec!(12000)), Currency::PHP).unwrap()
    }

    fn draft(unit: &Unit) -> ContractDraft {
        ContractDraft {
            tenant_id: TenantId::new(),
            unit_id: unit.id,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            monthly_rent: None,
            deposit: dec!(24000),
        }
    }

    #[test]
    fn test_new_contract_inherits_unit_rent() {
        let unit = unit();
        let contract = Contract::new(draft(&unit), &unit).unwrap();
        assert_eq!(contract.status, ContractStatus::Draft);
        assert_eq!(contract.monthly_rent, unit.monthly_rent);
        assert_eq!(contract.term_months(), 12);
    }

    #[test]
    fn test_start_must_precede_end() {
        let unit = unit();
        let mut d = draft(&unit);
        d.end_date = d.start_date;
        assert!(matches!(Contract::new(d, &unit), Err(RentalError::Validation(_))));
    }

    #[test]
    fn test_lifecycle() {
        let unit = unit();
        let mut contract = Contract::new(draft(&unit), &unit).unwrap();

        contract.sign().unwrap();
        assert!(contract.is_signed());
        contract.notarize().unwrap();
        assert!(contract.is_notarized());
        contract.terminate(Some("moved out".into())).unwrap();
        assert_eq!(contract.status, ContractStatus::Terminated);
        assert!(contract.terminated_at.is_some());
    }

    #[test]
    fn test_notarize_requires_signature() {
        let unit = unit();
        let mut contract = Contract::new(draft(&unit), &unit).unwrap();
        let err = contract.notarize().unwrap_err();
        assert!(matches!(err, RentalError::InvalidStateTransition { .. }));
        assert_eq!(contract.status, ContractStatus::Draft);
    }

    #[test]
    fn test_terminated_is_final() {
        let unit = unit();
        let mut contract = Contract::new(draft(&unit), &unit).unwrap();
        contract.terminate(None).unwrap();
        assert!(contract.sign().is_err());
        assert!(contract.terminate(None).is_err());
    }
}
