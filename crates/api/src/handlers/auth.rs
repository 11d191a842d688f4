//! Handler for operator login.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::{Extensions, HeaderMap};
use axum::Json;
use quizline_core::error::CoreError;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{generate_admin_token, ROLE_ADMIN};
use crate::auth::password::verify_password;
use crate::auth::rate_limit::client_ip;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /admin/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

/// POST /api/v1/admin/login
///
/// Every attempt counts against the caller's window, successful or not.
/// A wrong password is answered only after the configured delay.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    extensions: Extensions,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<LoginResponse>>> {
    // 1. Throttle per client.
    let peer = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client = client_ip(&headers, peer, state.config.admin.trust_forwarded_for);
    if let Err(retry_after_secs) = state.login_limiter.check(&client) {
        tracing::warn!(client = %client, retry_after_secs, "Admin login rate limited");
        return Err(AppError::Core(CoreError::TooManyRequests { retry_after_secs }));
    }

    // 2. Verify password.
    let valid = verify_password(&input.password, &state.config.admin.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !valid {
        tracing::warn!(client = %client, "Failed admin login");
        tokio::time::sleep(state.config.admin.failed_login_delay).await;
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid password".into(),
        )));
    }

    // 3. Issue token.
    let token = generate_admin_token(ROLE_ADMIN, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(client = %client, "Admin logged in");
    Ok(Json(DataResponse {
        data: LoginResponse {
            token,
            expires_in: state.config.jwt.expires_in_secs(),
        },
    }))
}
