use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use eduride_booking::notifications::{NotificationKind, FEED_LIMIT};
use eduride_booking::{BookingCoordinator, NotificationProjector};
use eduride_catalog::catalog::{CreateRide, RideCatalog};
use eduride_core::auth::AuthContext;
use eduride_store::MemoryStore;

fn request(pickup: &str, dropoff: &str) -> CreateRide {
    CreateRide {
        pickup: pickup.to_string(),
        dropoff: dropoff.to_string(),
        pickup_time: Utc::now() + Duration::hours(2),
        fare_minor: 5000,
        is_group: false,
        max_passengers: 1,
    }
}

fn harness() -> (RideCatalog, BookingCoordinator, NotificationProjector) {
    let store = Arc::new(MemoryStore::new());
    (
        RideCatalog::new(store.clone()),
        BookingCoordinator::new(store.clone()),
        NotificationProjector::new(store),
    )
}

#[tokio::test]
async fn test_booking_shows_up_for_both_sides() {
    let (catalog, coordinator, projector) = harness();
    let driver = AuthContext::driver(Uuid::new_v4());
    let student = AuthContext::student(Uuid::new_v4());

    let ride = catalog
        .create_ride(&driver, request("Library", "Mall"))
        .await
        .unwrap();
    coordinator.book_seat(ride.id, &student).await.unwrap();

    let student_feed = projector.project(&student).await.unwrap();
    assert_eq!(student_feed.len(), 1);
    assert_eq!(student_feed[0].kind, NotificationKind::Info);
    assert!(student_feed[0].message.contains("Library"));
    assert!(student_feed[0].message.contains("confirmed"));

    let driver_feed = projector.project(&driver).await.unwrap();
    assert_eq!(driver_feed.len(), 1);
    assert!(driver_feed[0].message.starts_with("New booking"));
}

#[tokio::test]
async fn test_in_progress_ride_notifies_the_rider() {
    let (catalog, coordinator, projector) = harness();
    let driver = AuthContext::driver(Uuid::new_v4());
    let student = AuthContext::student(Uuid::new_v4());

    let ride = catalog
        .create_ride(&driver, request("Library", "Mall"))
        .await
        .unwrap();
    coordinator.book_seat(ride.id, &student).await.unwrap();
    coordinator.start_ride(ride.id, &driver).await.unwrap();

    let feed = projector.project(&student).await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].kind, NotificationKind::Success);
    assert!(feed[0].message.contains("on the way"));
}

#[tokio::test]
async fn test_feed_is_bounded_and_newest_first() {
    let (catalog, coordinator, projector) = harness();
    let driver = AuthContext::driver(Uuid::new_v4());

    for i in 0..7 {
        let student = AuthContext::student(Uuid::new_v4());
        let ride = catalog
            .create_ride(&driver, request(&format!("Stop {i}"), "Campus"))
            .await
            .unwrap();
        coordinator.book_seat(ride.id, &student).await.unwrap();
    }

    let feed = projector.project(&driver).await.unwrap();
    assert_eq!(feed.len(), FEED_LIMIT);
    for pair in feed.windows(2) {
        assert!(pair[0].timestamp >= pair[1].timestamp);
    }
}

#[tokio::test]
async fn test_feed_is_deterministic_and_side_effect_free() {
    let (catalog, coordinator, projector) = harness();
    let driver = AuthContext::driver(Uuid::new_v4());
    let student = AuthContext::student(Uuid::new_v4());

    let ride = catalog
        .create_ride(&driver, request("Library", "Mall"))
        .await
        .unwrap();
    coordinator.book_seat(ride.id, &student).await.unwrap();

    let first = projector.project(&student).await.unwrap();
    let second = projector.project(&student).await.unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.message, b.message);
        assert_eq!(a.timestamp, b.timestamp);
    }
}

#[tokio::test]
async fn test_completed_rides_fall_out_of_the_feed() {
    let (catalog, coordinator, projector) = harness();
    let driver = AuthContext::driver(Uuid::new_v4());
    let student = AuthContext::student(Uuid::new_v4());

    let ride = catalog
        .create_ride(&driver, request("Library", "Mall"))
        .await
        .unwrap();
    coordinator.book_seat(ride.id, &student).await.unwrap();
    coordinator.start_ride(ride.id, &driver).await.unwrap();
    coordinator.complete_ride(ride.id, &driver).await.unwrap();

    assert!(projector.project(&student).await.unwrap().is_empty());
    assert!(projector.project(&driver).await.unwrap().is_empty());
}
