//! Partitioning readings into billing units
//!
//! When readings for many units are loaded together they are bucketed per
//! billing unit before pair resolution. A reading belongs to its pairing when
//! it has one, otherwise to its unit, otherwise to the `Unknown` bucket.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use core_kernel::{PairingId, UnitId};

use crate::reading::{UtilityReading, UtilityType};

/// Key of a billing-unit bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum BillingUnitKey {
    Pairing(PairingId),
    Unit(UnitId),
    Unknown,
}

impl BillingUnitKey {
    pub fn of(reading: &UtilityReading) -> Self {
        match (reading.pairing_id, reading.unit_id) {
            (Some(pairing), _) => BillingUnitKey::Pairing(pairing),
            (None, Some(unit)) => BillingUnitKey::Unit(unit),
            (None, None) => BillingUnitKey::Unknown,
        }
    }
}

impl fmt::Display for BillingUnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillingUnitKey::Pairing(id) => write!(f, "{}", id),
            BillingUnitKey::Unit(id) => write!(f, "{}", id),
            BillingUnitKey::Unknown => f.write_str("unknown"),
        }
    }
}

/// Readings of one billing unit, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct BillingUnitGroup<'a> {
    pub key: BillingUnitKey,
    pub readings: Vec<&'a UtilityReading>,
}

/// Buckets readings of `utility_type` by billing unit
///
/// Groups appear in order of their first reading; each group keeps its
/// readings in input order.
pub fn group_by_billing_unit(
    readings: &[UtilityReading],
    utility_type: UtilityType,
) -> Vec<BillingUnitGroup<'_>> {
    let mut groups: Vec<BillingUnitGroup<'_>> = Vec::new();
    let mut index: HashMap<BillingUnitKey, usize> = HashMap::new();

    for reading in readings.iter().filter(|r| r.utility_type == utility_type) {
        let key = BillingUnitKey::of(reading);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(BillingUnitGroup { key, readings: Vec::new() });
            groups.len() - 1
        });
        groups[slot].readings.push(reading);
    }

    groups
}
