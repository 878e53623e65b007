use axum_extra::headers::authorization::Bearer;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use eduride_core::auth::{AuthContext, Role};

use crate::error::AppError;

/// Claims of the bearer token issued by the identity collaborator.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: usize,
}

/// Decode the externally issued token into the actor context every
/// operation takes.
pub fn authenticate(bearer: &Bearer, secret: &str) -> Result<AuthContext, AppError> {
    let token_data = decode::<Claims>(
        bearer.token(),
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Authentication(e.to_string()))?;

    let claims = token_data.claims;
    let actor_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Authentication("token subject is not a valid id".to_string()))?;

    Ok(AuthContext {
        actor_id,
        role: claims.role,
    })
}
