use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use uuid::Uuid;

use eduride_booking::coordinator::BookingConfirmation;
use eduride_catalog::catalog::CreateRide;
use eduride_catalog::ride::Ride;

use crate::auth::authenticate;
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/rides", post(create_ride))
        .route("/v1/rides/available", get(list_available))
        .route("/v1/rides/mine", get(list_mine))
        .route("/v1/rides/booked", get(list_booked))
        .route("/v1/rides/{id}/book", post(book_seat))
        .route("/v1/rides/{id}/start", post(start_ride))
        .route("/v1/rides/{id}/complete", post(complete_ride))
        .route("/v1/rides/{id}/cancel", post(cancel_ride))
}

async fn create_ride(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Json(req): Json<CreateRide>,
) -> Result<Json<Ride>, AppError> {
    let auth = authenticate(&bearer, &state.auth.secret)?;
    let ride = state.catalog.create_ride(&auth, req).await?;
    Ok(Json(ride))
}

async fn list_available(State(state): State<AppState>) -> Result<Json<Vec<Ride>>, AppError> {
    let rides = state.catalog.list_available().await?;
    Ok(Json(rides))
}

/// Rides the authenticated actor advertised as a driver.
async fn list_mine(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Vec<Ride>>, AppError> {
    let auth = authenticate(&bearer, &state.auth.secret)?;
    let rides = state.catalog.rides_for_driver(auth.actor_id).await?;
    Ok(Json(rides))
}

/// Rides the authenticated actor occupies a seat on as a student.
async fn list_booked(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Vec<Ride>>, AppError> {
    let auth = authenticate(&bearer, &state.auth.secret)?;
    let rides = state.catalog.rides_for_student(auth.actor_id).await?;
    Ok(Json(rides))
}

async fn book_seat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<BookingConfirmation>, AppError> {
    let auth = authenticate(&bearer, &state.auth.secret)?;
    let confirmation = state.coordinator.book_seat(id, &auth).await?;
    Ok(Json(confirmation))
}

async fn start_ride(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Ride>, AppError> {
    let auth = authenticate(&bearer, &state.auth.secret)?;
    let ride = state.coordinator.start_ride(id, &auth).await?;
    Ok(Json(ride))
}

async fn complete_ride(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Ride>, AppError> {
    let auth = authenticate(&bearer, &state.auth.secret)?;
    let ride = state.coordinator.complete_ride(id, &auth).await?;
    Ok(Json(ride))
}

async fn cancel_ride(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Ride>, AppError> {
    let auth = authenticate(&bearer, &state.auth.secret)?;
    let ride = state.coordinator.cancel_ride(id, &auth).await?;
    Ok(Json(ride))
}
