//! HTTP-level integration tests for operator login and the admin endpoints.

mod common;

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::StatusCode;
use common::{admin_token, body_json, delete, get, get_auth, post_json, put_json_auth};
use quizline_db::models::quiz_result::CreateQuizResult;
use quizline_db::repositories::QuizResultRepo;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn insert_result(pool: &PgPool, email: &str, score: i32) -> i64 {
    QuizResultRepo::create(
        pool,
        &CreateQuizResult {
            email: email.to_string(),
            score,
            total_questions: 10,
            duration_seconds: Some(187),
        },
    )
    .await
    .expect("result insert should succeed")
    .id
}

fn valid_settings() -> serde_json::Value {
    json!({
        "timerEnabled": true,
        "timerSeconds": 45,
        "difficultyOrderEnabled": false,
        "showDifficultyBadge": true,
        "easyCount": 4,
        "mediumCount": 5,
        "hardCount": 1
    })
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn login_issues_one_hour_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/admin/login",
        json!({ "password": common::ADMIN_PASSWORD }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["token"].is_string());
    assert_eq!(json["data"]["expiresIn"], 3600);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn wrong_password_returns_401(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/admin/login", json!({ "password": "nope" })).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sixth_attempt_is_rate_limited(pool: PgPool) {
    let app = common::build_test_app(pool);
    let attempt = |app: axum::Router| async move {
        let request = axum::http::Request::post("/api/v1/admin/login")
            .header("content-type", "application/json")
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(axum::body::Body::from(json!({ "password": "nope" }).to_string()))
            .unwrap();
        common::send(app, request).await
    };

    for _ in 0..5 {
        assert_eq!(attempt(app.clone()).await.status(), StatusCode::UNAUTHORIZED);
    }
    let limited = attempt(app.clone()).await;
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.headers().contains_key("retry-after"));

    // Another client is unaffected.
    let response = post_json(
        app,
        "/api/v1/admin/login",
        json!({ "password": common::ADMIN_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_routes_require_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/admin/dashboard").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app, "/api/v1/admin/dashboard", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn non_admin_role_is_forbidden(pool: PgPool) {
    let config = common::test_config();
    let token = quizline_api::auth::jwt::generate_admin_token("viewer", &config.jwt).unwrap();
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/admin/dashboard", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn rotating_forwarded_for_does_not_reset_the_window(pool: PgPool) {
    let mut config = common::test_config();
    config.admin.trust_forwarded_for = false;
    let app = common::build_test_app_with(pool, config);
    let peer: SocketAddr = "198.51.100.4:51000".parse().unwrap();

    let attempt = |app: axum::Router, hop: usize| async move {
        let mut request = axum::http::Request::post("/api/v1/admin/login")
            .header("content-type", "application/json")
            .header("x-forwarded-for", format!("203.0.113.{hop}"))
            .body(axum::body::Body::from(json!({ "password": "nope" }).to_string()))
            .unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        common::send(app, request).await
    };

    for hop in 0..5 {
        assert_eq!(attempt(app.clone(), hop).await.status(), StatusCode::UNAUTHORIZED);
    }
    assert_eq!(attempt(app, 99).await.status(), StatusCode::TOO_MANY_REQUESTS);
}

// ---------------------------------------------------------------------------
// Dashboard and settings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn dashboard_lists_results_and_groups(pool: PgPool) {
    insert_result(&pool, "ana@example.com", 6).await;
    insert_result(&pool, "bruno@example.com", 10).await;
    insert_result(&pool, "carla@example.com", 6).await;
    let app = common::build_test_app(pool);
    let token = admin_token(app.clone()).await;

    let response = get_auth(app, "/api/v1/admin/dashboard", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();

    assert_eq!(data["questionsCount"], 10);
    assert_eq!(data["results"][0]["score"], 10);
    assert_eq!(data["settings"]["timerSeconds"], 180);
    assert_eq!(data["scoreGroups"][0]["score"], 10);
    assert_eq!(data["scoreGroups"][1]["count"], 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn settings_update_is_stored(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = admin_token(app.clone()).await;

    let response = put_json_auth(app.clone(), "/api/v1/admin/settings", valid_settings(), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let stored = body_json(response).await["data"].clone();
    assert_eq!(stored["timerSeconds"], 45);
    assert_eq!(stored["quota"]["hard"], 1);

    let dashboard = body_json(get_auth(app, "/api/v1/admin/dashboard", &token).await).await;
    assert_eq!(dashboard["data"]["settings"]["difficultyOrderEnabled"], false);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn settings_outside_bounds_are_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = admin_token(app.clone()).await;

    let mut too_short = valid_settings();
    too_short["timerSeconds"] = json!(10);
    let response = put_json_auth(app.clone(), "/api/v1/admin/settings", too_short, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut empty = valid_settings();
    empty["easyCount"] = json!(0);
    empty["mediumCount"] = json!(0);
    empty["hardCount"] = json!(0);
    let response = put_json_auth(app, "/api/v1/admin/settings", empty, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn quota_must_match_the_score_levels(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = admin_token(app.clone()).await;

    let mut fifteen = valid_settings();
    fifteen["easyCount"] = json!(5);
    fifteen["mediumCount"] = json!(5);
    fifteen["hardCount"] = json!(5);
    let response = put_json_auth(app.clone(), "/api/v1/admin/settings", fifteen, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("score levels"));

    let dashboard = body_json(get_auth(app, "/api/v1/admin/dashboard", &token).await).await;
    let quota = &dashboard["data"]["settings"]["quota"];
    assert_eq!(quota["easy"], 3);
    assert_eq!(quota["medium"], 4);
    assert_eq!(quota["hard"], 3);
}

// ---------------------------------------------------------------------------
// Participants and results
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn participants_and_ambassadors(pool: PgPool) {
    insert_result(&pool, "ana@example.com", 10).await;
    insert_result(&pool, "ana@example.com", 7).await;
    insert_result(&pool, "bruno@example.com", 10).await;
    let app = common::build_test_app(pool);
    let token = admin_token(app.clone()).await;

    let participants = body_json(get_auth(app.clone(), "/api/v1/admin/participants", &token).await).await;
    assert_eq!(participants["data"].as_array().unwrap().len(), 2);

    let ambassadors = body_json(get_auth(app.clone(), "/api/v1/admin/ambassadors", &token).await).await;
    let list = ambassadors["data"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["email"], "bruno@example.com");

    let history = body_json(
        get_auth(app.clone(), "/api/v1/admin/participants/ana@example.com/history", &token).await,
    )
    .await;
    assert_eq!(history["data"]["participationCount"], 2);
    assert_eq!(history["data"]["bestScore"], 10);

    let response = get_auth(app, "/api/v1/admin/participants/nobody@example.com/history", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_result_then_404(pool: PgPool) {
    let id = insert_result(&pool, "ana@example.com", 4).await;
    let app = common::build_test_app(pool);
    let token = admin_token(app.clone()).await;

    let uri = format!("/api/v1/admin/results/{id}");
    assert_eq!(delete(app.clone(), &uri, Some(&token)).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(delete(app.clone(), &uri, Some(&token)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(delete(app, &uri, None).await.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn answer_key_filters_by_difficulty(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = admin_token(app.clone()).await;

    let all = body_json(get_auth(app.clone(), "/api/v1/admin/questions", &token).await).await;
    assert_eq!(all["data"]["questions"].as_array().unwrap().len(), 10);
    assert_eq!(all["data"]["counts"]["medium"], 4);

    let hard = body_json(get_auth(app.clone(), "/api/v1/admin/questions?difficulty=hard", &token).await).await;
    let questions = hard["data"]["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);
    assert!(questions.iter().all(|q| q["difficulty"] == "hard"));
    assert!(questions[0]["correctKey"].is_string());
    assert_eq!(hard["data"]["counts"]["total"], 10);

    let response = get_auth(app, "/api/v1/admin/questions?difficulty=extreme", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
