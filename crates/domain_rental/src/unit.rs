//! Rentable units and unit pairings
//!
//! Two units of the same property may share one utility meter. Such units are
//! joined by a [`UnitPairing`], and their readings are billed against the
//! pairing instead of the individual units.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, Currency, Money, PairingId, PropertyId, Record, UnitId};

use crate::access::AccountScoped;
use crate::error::RentalError;

/// A rentable unit of a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub property_id: PropertyId,
    pub account_id: AccountId,
    pub name: String,
    pub monthly_rent: Money,
    /// Set while the unit shares a meter with another unit
    pub pairing_id: Option<PairingId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields of a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDraft {
    pub name: String,
    pub monthly_rent: Decimal,
}

impl UnitDraft {
    pub fn new(name: impl Into<String>, monthly_rent: Decimal) -> Self {
        Self {
            name: name.into(),
            monthly_rent,
        }
    }

    pub fn validate(&self) -> Result<(), RentalError> {
        if self.name.trim().is_empty() {
            return Err(RentalError::validation("unit name must not be empty"));
        }
        if self.monthly_rent.is_sign_negative() {
            return Err(RentalError::validation("monthly rent must not be negative"));
        }
        Ok(())
    }
}

impl Unit {
    pub fn new(
        property_id: PropertyId,
        account_id: AccountId,
        draft: UnitDraft,
        currency: Currency,
    ) -> Result<Self, RentalError> {
        draft.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: UnitId::new_v7(),
            property_id,
            account_id,
            name: draft.name.trim().to_string(),
            monthly_rent: Money::new(draft.monthly_rent, currency),
            pairing_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies new values; the rent keeps the unit's currency
    pub fn update(&mut self, draft: UnitDraft) -> Result<(), RentalError> {
        draft.validate()?;
        self.name = draft.name.trim().to_string();
        self.monthly_rent = Money::new(draft.monthly_rent, self.monthly_rent.currency());
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_paired(&self) -> bool {
        self.pairing_id.is_some()
    }
}

impl Record for Unit {
    type Id = UnitId;
    const COLLECTION: &'static str = "units";
    const ENTITY: &'static str = "Unit";

    fn record_id(&self) -> UnitId {
        self.id
    }
}

impl AccountScoped for Unit {
    fn account_id(&self) -> AccountId {
        self.account_id
    }
}

/// Two units of one property billed against a shared meter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitPairing {
    pub id: PairingId,
    pub property_id: PropertyId,
    pub account_id: AccountId,
    pub name: String,
    pub unit_ids: [UnitId; 2],
    pub created_at: DateTime<Utc>,
}

impl UnitPairing {
    /// Pairs `first` and `second`
    ///
    /// # Errors
    ///
    /// * `Validation` when the units are the same or belong to different properties
    /// * `Conflict` when either unit is already paired
    pub fn new(first: &Unit, second: &Unit, name: Option<String>) -> Result<Self, RentalError> {
        if first.id == second.id {
            return Err(RentalError::validation("a unit cannot be paired with itself"));
        }
        if first.property_id != second.property_id {
            return Err(RentalError::validation(
                "paired units must belong to the same property",
            ));
        }
        if let Some(paired) = [first, second].into_iter().find(|u| u.is_paired()) {
            return Err(RentalError::conflict(format!(
                "unit '{}' is already paired",
                paired.name
            )));
        }

        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("{} & {}", first.name, second.name));

        Ok(Self {
            id: PairingId::new_v7(),
            property_id: first.property_id,
            account_id: first.account_id,
            name,
            unit_ids: [first.id, second.id],
            created_at: Utc::now(),
        })
    }

    pub fn contains(&self, unit_id: UnitId) -> bool {
        self.unit_ids.contains(&unit_id)
    }
}

impl Record for UnitPairing {
    type Id = PairingId;
    const COLLECTION: &'static str = "unit_pairings";
    const ENTITY: &'static str = "UnitPairing";

    fn record_id(&self) -> PairingId {
        self.id
    }
}

impl AccountScoped for UnitPairing {
    fn account_id(&self) -> AccountId {
        self.account_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn unit(property_id: PropertyId, name: &str) -> Unit {
        Unit::new(property_id, AccountId::new(), UnitDraft::new(name, dec!(8500)), Currency::PHP).unwrap()
    }

    #[test]
    fn test_pairing_defaults_name() {
        let property = PropertyId::new();
        let a = unit(property, "1A");
        let b = unit(property, "1B");

        let pairing = UnitPairing::new(&a, &b, None).unwrap();
        assert_eq!(pairing.name, "1A & 1B");
        assert!(pairing.contains(a.id));
        assert!(pairing.contains(b.id));
    }

    #[test]
    fn test_pairing_rejects_same_unit() {
        let a = unit(PropertyId::new(), "1A");
        assert!(matches!(UnitPairing::new(&a, &a, None), Err(RentalError::Validation(_))));
    }

    #[test]
    fn test_pairing_rejects_cross_property() {
        let a = unit(PropertyId::new(), "1A");
        let b = unit(PropertyId::new(), "1B");
        assert!(matches!(UnitPairing::new(&a, &b, None), Err(RentalError::Validation(_))));
    }

    #[test]
    fn test_pairing_rejects_already_paired() {
        let property = PropertyId::new();
        let mut a = unit(property, "1A");
        let b = unit(property, "1B");
        a.pairing_id = Some(PairingId::new());
        assert!(matches!(UnitPairing::new(&a, &b, None), Err(RentalError::Conflict(_))));
    }

    #[test]
    fn test_negative_rent_rejected() {
        let draft = UnitDraft::new("2A", dec!(-1));
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_update_keeps_currency() {
        let mut u = unit(PropertyId::new(), "1A");
        u.update(UnitDraft::new("1A (renovated)", dec!(9000))).unwrap();
        assert_eq!(u.monthly_rent, Money::new(dec!(9000), Currency::PHP));
        assert_eq!(u.name, "1A (renovated)");
    }
}
