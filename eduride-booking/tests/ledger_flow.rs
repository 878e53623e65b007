use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use eduride_booking::PaymentLedger;
use eduride_catalog::catalog::{CreateRide, RideCatalog};
use eduride_catalog::repository::RideStore;
use eduride_catalog::ride::Ride;
use eduride_core::auth::AuthContext;
use eduride_core::error::DomainError;
use eduride_core::payment::{PaymentMethod, PaymentStatus, QrPayload};
use eduride_store::MemoryStore;

fn request() -> CreateRide {
    CreateRide {
        pickup: "Library".to_string(),
        dropoff: "Mall".to_string(),
        pickup_time: Utc::now() + Duration::hours(2),
        fare_minor: 5000,
        is_group: false,
        max_passengers: 1,
    }
}

fn harness() -> (Arc<MemoryStore>, RideCatalog, PaymentLedger) {
    let store = Arc::new(MemoryStore::new());
    (
        store.clone(),
        RideCatalog::new(store.clone()),
        PaymentLedger::new(store.clone(), store),
    )
}

#[tokio::test]
async fn test_intent_snapshots_fare_at_call_time() {
    let (store, catalog, ledger) = harness();
    let driver = AuthContext::driver(Uuid::new_v4());
    let student = AuthContext::student(Uuid::new_v4());

    let ride = catalog.create_ride(&driver, request()).await.unwrap();
    let payment = ledger
        .record_intent(ride.id, &student, PaymentMethod::Cash)
        .await
        .unwrap();

    assert_eq!(payment.amount_minor, 5000);
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.qr_payload, None);

    // The fare changing later must not touch the recorded amount.
    store
        .update_ride(ride.id, &|r: &mut Ride| {
            r.fare_minor = 9999;
            Ok(())
        })
        .await
        .unwrap();

    let stored = ledger.payments_for_ride(ride.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].amount_minor, 5000);
}

#[tokio::test]
async fn test_upi_intent_carries_the_qr_contract() {
    let (_store, catalog, ledger) = harness();
    let driver = AuthContext::driver(Uuid::new_v4());
    let student = AuthContext::student(Uuid::new_v4());

    let ride = catalog.create_ride(&driver, request()).await.unwrap();
    let payment = ledger
        .record_intent(ride.id, &student, PaymentMethod::Upi)
        .await
        .unwrap();

    let serialized = payment.qr_payload.expect("UPI intent carries a payload");
    let payload: QrPayload = serde_json::from_str(&serialized).unwrap();
    assert_eq!(payload.ride_id, ride.id);
    assert_eq!(payload.driver_id, ride.driver_id);
    assert_eq!(payload.amount, 5000);
    assert_eq!(payload.timestamp, payment.created_at);

    // Exactly the four contract fields, nothing else.
    let value: serde_json::Value = serde_json::from_str(&serialized).unwrap();
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
    assert_eq!(keys.len(), 4);
    for key in ["ride_id", "driver_id", "amount", "timestamp"] {
        assert!(keys.contains(&key), "missing field {key}");
    }
}

#[tokio::test]
async fn test_settlement_happens_exactly_once() {
    let (_store, catalog, ledger) = harness();
    let driver = AuthContext::driver(Uuid::new_v4());
    let student = AuthContext::student(Uuid::new_v4());

    let ride = catalog.create_ride(&driver, request()).await.unwrap();
    let payment = ledger
        .record_intent(ride.id, &student, PaymentMethod::Cash)
        .await
        .unwrap();

    let settled = ledger
        .mark_status(payment.id, PaymentStatus::Completed)
        .await
        .unwrap();
    assert_eq!(settled.status, PaymentStatus::Completed);

    // Any repeat after the terminal commit is rejected.
    let result = ledger.mark_status(payment.id, PaymentStatus::Completed).await;
    assert!(matches!(
        result,
        Err(DomainError::InvalidPaymentState { .. })
    ));
    let result = ledger.mark_status(payment.id, PaymentStatus::Failed).await;
    assert!(matches!(
        result,
        Err(DomainError::InvalidPaymentState { .. })
    ));
}

#[tokio::test]
async fn test_intent_requires_existing_ride_and_student_role() {
    let (_store, catalog, ledger) = harness();
    let driver = AuthContext::driver(Uuid::new_v4());
    let student = AuthContext::student(Uuid::new_v4());

    let result = ledger
        .record_intent(Uuid::new_v4(), &student, PaymentMethod::Cash)
        .await;
    assert!(matches!(result, Err(DomainError::NotFound(_))));

    let ride = catalog.create_ride(&driver, request()).await.unwrap();
    let result = ledger.record_intent(ride.id, &driver, PaymentMethod::Cash).await;
    assert!(matches!(result, Err(DomainError::Authorization(_))));
}

#[tokio::test]
async fn test_ride_payments_listed_in_creation_order() {
    let (_store, catalog, ledger) = harness();
    let driver = AuthContext::driver(Uuid::new_v4());
    let s1 = AuthContext::student(Uuid::new_v4());
    let s2 = AuthContext::student(Uuid::new_v4());

    let ride = catalog.create_ride(&driver, request()).await.unwrap();
    let first = ledger
        .record_intent(ride.id, &s1, PaymentMethod::Cash)
        .await
        .unwrap();
    let second = ledger
        .record_intent(ride.id, &s2, PaymentMethod::Upi)
        .await
        .unwrap();

    let listed = ledger.payments_for_ride(ride.id).await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}
