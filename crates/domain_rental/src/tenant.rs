//! Tenants

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, Record, TenantId, UnitId};

use crate::access::AccountScoped;
use crate::error::RentalError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub account_id: AccountId,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Unit currently occupied, if any
    pub unit_id: Option<UnitId>,
    pub move_in_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields of a tenant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantDraft {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub unit_id: Option<UnitId>,
    pub move_in_date: Option<NaiveDate>,
}

impl TenantDraft {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), RentalError> {
        if self.full_name.trim().is_empty() {
            return Err(RentalError::validation("tenant name must not be empty"));
        }
        if let Some(email) = self.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            if !email.contains('@') {
                return Err(RentalError::validation(format!("invalid email '{}'", email)));
            }
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Tenant {
    pub fn new(account_id: AccountId, draft: TenantDraft) -> Result<Self, RentalError> {
        draft.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: TenantId::new_v7(),
            account_id,
            full_name: draft.full_name.trim().to_string(),
            email: non_blank(draft.email),
            phone: non_blank(draft.phone),
            unit_id: draft.unit_id,
            move_in_date: draft.move_in_date,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update(&mut self, draft: TenantDraft) -> Result<(), RentalError> {
        draft.validate()?;
        self.full_name = draft.full_name.trim().to_string();
        self.email = non_blank(draft.email);
        self.phone = non_blank(draft.phone);
        self.unit_id = draft.unit_id;
        self.move_in_date = draft.move_in_date;
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Record for Tenant {
    type Id = TenantId;
    const COLLECTION: &'static str = "tenants";
    const ENTITY: &'static str = "Tenant";

    fn record_id(&self) -> TenantId {
        self.id
    }
}

impl AccountScoped for Tenant {
    fn account_id(&self) -> AccountId {
        self.account_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_contact_fields_are_dropped() {
        let draft = TenantDraft {
            email: Some("  ".into()),
            phone: Some(" 0917 555 0101 ".into()),
            ..TenantDraft::new("Juan dela Cruz")
        };
        let tenant = Tenant::new(AccountId::new(), draft).unwrap();
        assert_eq!(tenant.email, None);
        assert_eq!(tenant.phone.as_deref(), Some("0917 555 0101"));
    }

    #[test]
    fn test_email_must_look_like_an_address() {
        let draft = TenantDraft {
            email: Some("juan.example.com".into()),
            ..TenantDraft::new("Juan")
        };
        assert!(matches!(draft.validate(), Err(RentalError::Validation(_))));
    }
}
