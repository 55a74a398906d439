//! Bearer token authentication for account routes

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use tracing::error;
use uuid::Uuid;

use crate::{AppState, error::AuthError};

/// Signed-in caller, available to handlers behind `auth_middleware`
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub token: String,
    pub exp: u64,
}

/// Token of an `Authorization: Bearer <token>` header
pub fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(&req).ok_or(AuthError::Unauthorized)?.to_string();

    let claims = state.jwt_service.validate_token(&token).map_err(|e| {
        error!("Failed to validate token: {}", e);
        AuthError::Unauthorized
    })?;

    let is_blacklisted = state
        .jwt_service
        .is_token_blacklisted(&state.redis_pool, &token)
        .await?;
    if is_blacklisted {
        return Err(AuthError::Unauthorized);
    }

    req.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
        token,
        exp: claims.exp,
    });

    Ok(next.run(req).await)
}
