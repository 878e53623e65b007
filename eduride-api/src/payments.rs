use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use serde::Deserialize;
use uuid::Uuid;

use eduride_core::payment::{Payment, PaymentMethod, PaymentStatus};

use crate::auth::authenticate;
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/payments", post(record_intent))
        .route("/v1/payments/{id}/status", post(mark_status))
}

#[derive(Debug, Deserialize)]
struct RecordIntentRequest {
    ride_id: Uuid,
    method: PaymentMethod,
}

#[derive(Debug, Deserialize)]
struct MarkStatusRequest {
    status: PaymentStatus,
}

async fn record_intent(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Json(req): Json<RecordIntentRequest>,
) -> Result<Json<Payment>, AppError> {
    let auth = authenticate(&bearer, &state.auth.secret)?;
    let payment = state
        .ledger
        .record_intent(req.ride_id, &auth, req.method)
        .await?;
    Ok(Json(payment))
}

async fn mark_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Json(req): Json<MarkStatusRequest>,
) -> Result<Json<Payment>, AppError> {
    // Any authenticated caller may settle; the ledger guards the transition.
    authenticate(&bearer, &state.auth.secret)?;
    let payment = state.ledger.mark_status(id, req.status).await?;
    Ok(Json(payment))
}
