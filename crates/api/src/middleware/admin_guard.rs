//! Guard for the dashboard routes.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use quizline_core::error::CoreError;

use crate::auth::jwt::{validate_token, ROLE_ADMIN};
use crate::error::AppError;
use crate::state::AppState;

/// A verified operator token, taken from `Authorization: Bearer <token>`.
///
/// Missing or unverifiable tokens are rejected with 401; a valid token
/// without the `admin` role is rejected with 403.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token_id: String,
    /// Unix timestamp after which the operator has to log in again.
    pub expires_at: i64,
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.to_string()))
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    header
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| unauthorized("Expected: Bearer <token>"))
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        if claims.role != ROLE_ADMIN {
            tracing::warn!(jti = %claims.jti, role = %claims.role, "Token without admin role");
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }

        Ok(AdminSession {
            token_id: claims.jti,
            expires_at: claims.exp,
        })
    }
}
