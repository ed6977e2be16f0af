//! Record store port
//!
//! Every persisted entity of the rental service lives in a *collection* of
//! JSON records addressed by UUID and queried with simple field-equality
//! filters. The domains only see [`Repository<T>`], a typed view over an
//! object-safe [`RecordStore`]; adapters decide where the JSON actually goes.
//!
//! # Example
//!
//! ```rust,ignore
//! let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
//! let readings: Repository<UtilityReading> = Repository::new(store);
//!
//! readings.save(&reading).await?;
//! let for_unit = readings
//!     .list(&RecordFilter::new().eq("unit_id", unit_id))
//!     .await?;
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::ports::{DomainPort, HealthCheckable, PortError};

/// A domain type stored as one JSON record in a named collection
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Typed identifier of the record
    type Id: Copy + Into<Uuid> + fmt::Display + Send + Sync;

    /// Collection (table) name
    const COLLECTION: &'static str;

    /// Human readable entity name used in error messages
    const ENTITY: &'static str;

    fn record_id(&self) -> Self::Id;
}

/// Conjunction of top-level field equality conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    conditions: Vec<(String, Value)>,
}

impl RecordFilter {
    /// Creates an empty filter matching every record
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `field == value` condition
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    /// Returns true if `payload` satisfies every condition
    pub fn matches(&self, payload: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| payload.get(field) == Some(expected))
    }

    /// Renders the filter as a JSON object (containment form)
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self.conditions.iter().cloned().collect();
        Value::Object(map)
    }
}

/// Object-safe storage port over raw JSON payloads
///
/// `list_raw` must return records in insertion order.
#[async_trait]
pub trait RecordStore: DomainPort + HealthCheckable {
    async fn get_raw(&self, collection: &str, id: Uuid) -> Result<Option<Value>, PortError>;

    async fn list_raw(
        &self,
        collection: &str,
        filter: &RecordFilter,
    ) -> Result<Vec<Value>, PortError>;

    /// Inserts or replaces the record with the given id
    async fn put_raw(&self, collection: &str, id: Uuid, payload: Value) -> Result<(), PortError>;

    /// Removes a record, returning whether it existed
    async fn delete_raw(&self, collection: &str, id: Uuid) -> Result<bool, PortError>;
}

/// Typed access to one collection of a [`RecordStore`]
pub struct Repository<T> {
    store: Arc<dyn RecordStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Repository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("collection", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: Record> Repository<T> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub async fn find_by_id(&self, id: T::Id) -> Result<Option<T>, PortError> {
        match self.store.get_raw(T::COLLECTION, id.into()).await? {
            Some(payload) => decode(payload).map(Some),
            None => Ok(None),
        }
    }

    /// Fetches a record, failing with `PortError::NotFound` when absent
    pub async fn get(&self, id: T::Id) -> Result<T, PortError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| PortError::not_found(T::ENTITY, id))
    }

    pub async fn list(&self, filter: &RecordFilter) -> Result<Vec<T>, PortError> {
        self.store
            .list_raw(T::COLLECTION, filter)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn save(&self, record: &T) -> Result<(), PortError> {
        let payload = serde_json::to_value(record)
            .map_err(|e| PortError::transformation(format!("{}: {}", T::ENTITY, e)))?;
        let id = record.record_id();
        debug!(collection = T::COLLECTION, %id, "Saving record");
        self.store.put_raw(T::COLLECTION, id.into(), payload).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), PortError> {
        if self.store.delete_raw(T::COLLECTION, id.into()).await? {
            Ok(())
        } else {
            Err(PortError::not_found(T::ENTITY, id))
        }
    }
}

fn decode<T: Record>(payload: Value) -> Result<T, PortError> {
    serde_json::from_value(payload).map_err(|e| {
        warn!(collection = T::COLLECTION, error = %e, "Stored record does not decode");
        PortError::transformation(format!("{}: {}", T::ENTITY, e))
    })
}

/// In-memory record store
///
/// Used by the server's `memory` backend and throughout the test suites.
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::RwLock;
    use chrono::Utc;

    use crate::ports::{AdapterHealth, HealthCheckResult};

    #[derive(Debug, Default)]
    pub struct InMemoryRecordStore {
        collections: RwLock<HashMap<String, Vec<(Uuid, Value)>>>,
    }

    impl InMemoryRecordStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of records held in a collection
        pub async fn count(&self, collection: &str) -> usize {
            self.collections
                .read()
                .await
                .get(collection)
                .map_or(0, Vec::len)
        }
    }

    impl DomainPort for InMemoryRecordStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryRecordStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "in-memory-record-store".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: None,
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl RecordStore for InMemoryRecordStore {
        async fn get_raw(&self, collection: &str, id: Uuid) -> Result<Option<Value>, PortError> {
            let collections = self.collections.read().await;
            Ok(collections
                .get(collection)
                .and_then(|records| records.iter().find(|(key, _)| *key == id))
                .map(|(_, payload)| payload.clone()))
        }

        async fn list_raw(
            &self,
            collection: &str,
            filter: &RecordFilter,
        ) -> Result<Vec<Value>, PortError> {
            let collections = self.collections.read().await;
            Ok(collections
                .get(collection)
                .map(|records| {
                    records
                        .iter()
                        .filter(|(_, payload)| filter.matches(payload))
                        .map(|(_, payload)| payload.clone())
                        .collect()
                })
                .unwrap_or_default())
        }

        async fn put_raw(&self, collection: &str, id: Uuid, payload: Value) -> Result<(), PortError> {
            let mut collections = self.collections.write().await;
            let records = collections.entry(collection.to_string()).or_default();
            match records.iter_mut().find(|(key, _)| *key == id) {
                Some((_, existing)) => *existing = payload,
                None => records.push((id, payload)),
            }
            Ok(())
        }

        async fn delete_raw(&self, collection: &str, id: Uuid) -> Result<bool, PortError> {
            let mut collections = self.collections.write().await;
            let Some(records) = collections.get_mut(collection) else {
                return Ok(false);
            };
            let before = records.len();
            records.retain(|(key, _)| *key != id);
            Ok(records.len() != before)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::memory::InMemoryRecordStore;
    use serde::Deserialize;
    use serde_json::json;

    use crate::identifiers::UnitId;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Meter {
        id: UnitId,
        label: String,
        floor: u8,
    }

    impl Record for Meter {
        type Id = UnitId;
        const COLLECTION: &'static str = "meters";
        const ENTITY: &'static str = "Meter";

        fn record_id(&self) -> UnitId {
            self.id
        }
    }

    fn repository() -> Repository<Meter> {
        Repository::new(Arc::new(InMemoryRecordStore::new()))
    }

    #[test]
    fn test_filter_matches_top_level_fields() {
        let filter = RecordFilter::new().eq("floor", 2).eq("label", "B");
        assert!(filter.matches(&json!({"floor": 2, "label": "B", "x": 1})));
        assert!(!filter.matches(&json!({"floor": 1, "label": "B"})));
        assert!(!filter.matches(&json!({"label": "B"})));
        assert!(RecordFilter::new().matches(&json!({})));
    }

    #[tokio::test]
    async fn test_save_get_and_replace() {
        let repo = repository();
        let mut meter = Meter { id: UnitId::new(), label: "A".into(), floor: 1 };
        repo.save(&meter).await.unwrap();

        meter.label = "A2".into();
        repo.save(&meter).await.unwrap();

        let all = repo.list(&RecordFilter::new()).await.unwrap();
        assert_eq!(all, vec![meter.clone()]);
        assert_eq!(repo.get(meter.id).await.unwrap(), meter);
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let repo = repository();
        let ids: Vec<UnitId> = (0..3).map(|_| UnitId::new()).collect();
        for (i, id) in ids.iter().enumerate() {
            repo.save(&Meter { id: *id, label: format!("M{i}"), floor: 1 }).await.unwrap();
        }

        let listed: Vec<UnitId> = repo
            .list(&RecordFilter::new().eq("floor", 1))
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let repo = repository();
        let err = repo.get(UnitId::new()).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(repo.delete(UnitId::new()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let repo = repository();
        let meter = Meter { id: UnitId::new(), label: "A".into(), floor: 1 };
        repo.save(&meter).await.unwrap();
        repo.delete(meter.id).await.unwrap();
        assert!(repo.find_by_id(meter.id).await.unwrap().is_none());
    }
}
