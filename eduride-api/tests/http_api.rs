use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use eduride_api::{
    app,
    auth::Claims,
    state::{AppState, AuthConfig},
};
use eduride_booking::{BookingCoordinator, NotificationProjector, PaymentLedger};
use eduride_catalog::catalog::RideCatalog;
use eduride_core::auth::Role;
use eduride_store::MemoryStore;

const SECRET: &str = "test-secret";

fn test_app() -> axum::Router {
    let store = Arc::new(MemoryStore::new());
    app(AppState {
        catalog: Arc::new(RideCatalog::new(store.clone())),
        coordinator: Arc::new(BookingCoordinator::new(store.clone())),
        ledger: Arc::new(PaymentLedger::new(store.clone(), store.clone())),
        projector: Arc::new(NotificationProjector::new(store)),
        auth: AuthConfig {
            secret: SECRET.to_string(),
        },
    })
}

fn token(actor_id: Uuid, role: Role) -> String {
    let claims = Claims {
        sub: actor_id.to_string(),
        role,
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn create_ride_body() -> Value {
    json!({
        "pickup": "Library",
        "dropoff": "Mall",
        "pickup_time": (Utc::now() + Duration::hours(2)).to_rfc3339(),
        "fare_minor": 5000,
        "is_group": false,
        "max_passengers": 1,
    })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_ride_booking_over_http() {
    let app = test_app();
    let driver = token(Uuid::new_v4(), Role::Driver);
    let student = token(Uuid::new_v4(), Role::Student);
    let other_student = token(Uuid::new_v4(), Role::Student);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/v1/rides",
            Some(&driver),
            Some(create_ride_body()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ride = body_json(response).await;
    let ride_id = ride["id"].as_str().unwrap().to_string();
    assert_eq!(ride["status"], "AVAILABLE");

    // The new ride is publicly listed.
    let response = app
        .clone()
        .oneshot(request(Method::GET, "/v1/rides/available", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/v1/rides/{ride_id}/book"),
            Some(&student),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let confirmation = body_json(response).await;
    assert_eq!(confirmation["status"], "BOOKED");

    // A losing second booking maps to 409.
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/v1/rides/{ride_id}/book"),
            Some(&other_student),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_role_and_token_failures_map_to_statuses() {
    let app = test_app();
    let student = token(Uuid::new_v4(), Role::Student);

    // Students cannot advertise rides.
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/v1/rides",
            Some(&student),
            Some(create_ride_body()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Garbage token.
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/v1/rides",
            Some("not-a-token"),
            Some(create_ride_body()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Unknown ride.
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/v1/rides/{}/book", Uuid::new_v4()),
            Some(&student),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Malformed creation input.
    let mut body = create_ride_body();
    body["fare_minor"] = json!(0);
    let driver = token(Uuid::new_v4(), Role::Driver);
    let response = app
        .clone()
        .oneshot(request(Method::POST, "/v1/rides", Some(&driver), Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payment_and_notification_endpoints() {
    let app = test_app();
    let driver_id = Uuid::new_v4();
    let driver = token(driver_id, Role::Driver);
    let student = token(Uuid::new_v4(), Role::Student);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/v1/rides",
            Some(&driver),
            Some(create_ride_body()),
        ))
        .await
        .unwrap();
    let ride = body_json(response).await;
    let ride_id = ride["id"].as_str().unwrap().to_string();

    app.clone()
        .oneshot(request(
            Method::POST,
            &format!("/v1/rides/{ride_id}/book"),
            Some(&student),
            None,
        ))
        .await
        .unwrap();

    // UPI intent returns the serialized QR payload.
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/v1/payments",
            Some(&student),
            Some(json!({ "ride_id": ride_id, "method": "UPI" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let payment = body_json(response).await;
    assert_eq!(payment["status"], "PENDING");
    assert_eq!(payment["amount_minor"], 5000);
    let payment_id = payment["id"].as_str().unwrap().to_string();
    let qr: Value =
        serde_json::from_str(payment["qr_payload"].as_str().unwrap()).unwrap();
    assert_eq!(qr["ride_id"], ride_id.as_str());
    assert_eq!(qr["driver_id"], driver_id.to_string().as_str());

    // Settle once, then a repeat conflicts.
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/v1/payments/{payment_id}/status"),
            Some(&driver),
            Some(json!({ "status": "COMPLETED" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/v1/payments/{payment_id}/status"),
            Some(&driver),
            Some(json!({ "status": "COMPLETED" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Both sides see the booking in their feed.
    let response = app
        .clone()
        .oneshot(request(Method::GET, "/v1/notifications", Some(&student), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let feed = body_json(response).await;
    assert_eq!(feed.as_array().unwrap().len(), 1);

    let response = app
        .oneshot(request(Method::GET, "/v1/notifications", Some(&driver), None))
        .await
        .unwrap();
    let feed = body_json(response).await;
    assert_eq!(feed.as_array().unwrap().len(), 1);
}
