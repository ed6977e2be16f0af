//! PostgreSQL record store integration tests
//!
//! Each test starts its own container; run with `cargo test -- --ignored`
//! on a machine with Docker.

use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

use core_kernel::{HealthCheckable, RecordFilter, RecordStore, UnitId};
use domain_billing::{BillingError, BillingService, BillingUnitKey, PaymentRemark};
use infra_db::PostgresRecordStore;
use test_utils::database::TestDatabase;
use test_utils::ReadingFixtures;

#[tokio::test]
#[ignore = "requires docker"]
async fn test_put_get_and_replace() {
    let db = TestDatabase::new().await.unwrap();
    let store = db.store();
    let id = Uuid::new_v4();

    store.put_raw("units", id, json!({"id": id, "name": "Unit 1"})).await.unwrap();
    store.put_raw("units", id, json!({"id": id, "name": "Unit 1A"})).await.unwrap();

    let stored = store.get_raw("units", id).await.unwrap().unwrap();
    assert_eq!(stored["name"], "Unit 1A");
    assert!(store.get_raw("tenants", id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_list_filters_by_containment_in_insertion_order() {
    let db = TestDatabase::new().await.unwrap();
    let store = db.store();

    let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    store.put_raw("readings", ids[0], json!({"floor": 1, "pairing_id": null})).await.unwrap();
    store.put_raw("readings", ids[1], json!({"floor": 2, "pairing_id": null})).await.unwrap();
    store.put_raw("readings", ids[2], json!({"floor": 1, "pairing_id": "p-1"})).await.unwrap();

    let first_floor = store
        .list_raw("readings", &RecordFilter::new().eq("floor", 1))
        .await
        .unwrap();
    assert_eq!(first_floor.len(), 2);

    let unpaired = store
        .list_raw("readings", &RecordFilter::new().eq("pairing_id", serde_json::Value::Null))
        .await
        .unwrap();
    let floors: Vec<_> = unpaired.iter().map(|r| r["floor"].clone()).collect();
    assert_eq!(floors, vec![json!(1), json!(2)]);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_delete_reports_whether_a_row_was_removed() {
    let db = TestDatabase::new().await.unwrap();
    let store = db.store();
    let id = Uuid::new_v4();

    store.put_raw("tenants", id, json!({"id": id})).await.unwrap();
    assert!(store.delete_raw("tenants", id).await.unwrap());
    assert!(!store.delete_raw("tenants", id).await.unwrap());

    db.clear_data().await.unwrap();
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_non_object_payload_is_rejected() {
    let db = TestDatabase::new().await.unwrap();
    let store = db.store();

    let result = store.put_raw("units", Uuid::new_v4(), json!([1, 2])).await;
    assert!(result.is_err());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_health_check_against_live_database() {
    let db = TestDatabase::new().await.unwrap();
    let store = PostgresRecordStore::new(db.pool().clone());

    assert!(store.health_check().await.is_healthy());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_billing_over_postgres() {
    let db = TestDatabase::new().await.unwrap();
    let billing = BillingService::new(db.store());
    let unit = UnitId::new();

    let previous = billing
        .record_reading(ReadingFixtures::previous_water(unit))
        .await
        .unwrap();
    let current = billing
        .record_reading(ReadingFixtures::current_water(unit))
        .await
        .unwrap();

    let result = billing.generate_billing(previous.id, "Unit 3A", "Maria Santos").await;
    assert!(matches!(result, Err(BillingError::PreviousReadingNotFound(_))));

    billing
        .record_payment(current.id, true, "user-staff", None)
        .await
        .unwrap();
    let data = billing
        .generate_billing(current.id, "Unit 3A", "Maria Santos")
        .await
        .unwrap();
    assert_eq!(data.total_usage, dec!(25));
    assert_eq!(data.first_floor_amount, dec!(800));
    assert_eq!(data.remarks, PaymentRemark::Paid);

    let latest = billing
        .latest_readings(BillingUnitKey::Unit(unit), current.utility_type)
        .await
        .unwrap();
    assert_eq!(latest.current.map(|r| r.id), Some(current.id));
}
