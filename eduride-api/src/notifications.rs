use axum::{extract::State, routing::get, Json, Router};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;

use eduride_booking::notifications::Notification;

use crate::auth::authenticate;
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/notifications", get(get_notifications))
}

async fn get_notifications(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let auth = authenticate(&bearer, &state.auth.secret)?;
    let feed = state.projector.project(&auth).await?;
    Ok(Json(feed))
}
