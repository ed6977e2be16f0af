//! Rental properties

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, PropertyId, Record};

use crate::access::AccountScoped;
use crate::error::RentalError;

/// A building or lot managed by one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub account_id: AccountId,
    pub name: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields of a property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDraft {
    pub name: String,
    pub address: String,
}

impl PropertyDraft {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    pub fn validate(&self) -> Result<(), RentalError> {
        if self.name.trim().is_empty() {
            return Err(RentalError::validation("property name must not be empty"));
        }
        Ok(())
    }
}

impl Property {
    pub fn new(account_id: AccountId, draft: PropertyDraft) -> Result<Self, RentalError> {
        draft.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: PropertyId::new_v7(),
            account_id,
            name: draft.name.trim().to_string(),
            address: draft.address.trim().to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update(&mut self, draft: PropertyDraft) -> Result<(), RentalError> {
        draft.validate()?;
        self.name = draft.name.trim().to_string();
        self.address = draft.address.trim().to_string();
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Record for Property {
    type Id = PropertyId;
    const COLLECTION: &'static str = "properties";
    const ENTITY: &'static str = "Property";

    fn record_id(&self) -> PropertyId {
        self.id
    }
}

impl AccountScoped for Property {
    fn account_id(&self) -> AccountId {
        self.account_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_trims_fields() {
        let property = Property::new(
            AccountId::new(),
            PropertyDraft::new("  Sampaguita Apartments ", " 12 Mabini St "),
        )
        .unwrap();
        assert_eq!(property.name, "Sampaguita Apartments");
        assert_eq!(property.address, "12 Mabini St");
    }

    #[test]
    fn test_blank_name_rejected() {
        let result = Property::new(AccountId::new(), PropertyDraft::new(" ", "addr"));
        assert!(matches!(result, Err(RentalError::Validation(_))));
    }
}
