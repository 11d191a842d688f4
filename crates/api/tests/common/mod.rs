#![allow(dead_code)]

use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use quizline_api::auth::jwt::JwtConfig;
use quizline_api::auth::password::hash_password;
use quizline_api::config::{AdminConfig, QuizConfig, ServerConfig};
use quizline_api::router::build_app_router;
use quizline_api::state::AppState;
use quizline_core::session::Pacing;
use sqlx::PgPool;
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig`.
///
/// Session pacing is shortened so a full quiz runs in well under a second,
/// and the failed-login delay is kept small.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            token_expiry_mins: 60,
        },
        admin: AdminConfig {
            password_hash: hash_password(ADMIN_PASSWORD).expect("hashing should succeed"),
            failed_login_delay: Duration::from_millis(50),
            trust_forwarded_for: true,
        },
        quiz: QuizConfig {
            pacing: Pacing {
                feedback_delay: Duration::from_millis(5),
                advance_delay: Duration::from_millis(5),
                typing_delay: Duration::from_millis(1),
                reveal_interval: Duration::ZERO,
                tick_interval: Duration::from_secs(1),
            },
            ..QuizConfig::default()
        },
    }
}

/// Build the application router with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

/// Same as [`build_test_app`] with a caller-adjusted config.
pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState::new(pool, config.clone());
    build_app_router(state, &config)
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, Method::POST, uri, body, None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    json_request(app, Method::PUT, uri, body, Some(token)).await
}

pub async fn delete(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    let mut builder = Request::delete(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

async fn json_request(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Log in as the operator and return the bearer token.
pub async fn admin_token(app: Router) -> String {
    let response = post_json(
        app,
        "/api/v1/admin/login",
        serde_json::json!({ "password": ADMIN_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    body_json(response).await["data"]["token"]
        .as_str()
        .expect("token should be a string")
        .to_string()
}
