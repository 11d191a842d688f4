use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quizline_api::background::session_sweeper;
use quizline_api::config::ServerConfig;
use quizline_api::router::build_app_router;
use quizline_api::state::AppState;
use quizline_db::repositories::QuestionRepo;
use quizline_db::DbPool;

/// Connect, check and migrate. Startup aborts on any failure.
async fn connect_database() -> DbPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = quizline_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    quizline_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    quizline_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database ready (pool created, migrations applied)");
    pool
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quizline_api=debug,quizline_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let pool = connect_database().await;
    match QuestionRepo::count(&pool).await {
        Ok(0) => tracing::warn!("Question pool is empty; quizzes will end immediately"),
        Ok(count) => tracing::info!(count, "Question pool loaded"),
        Err(e) => tracing::warn!(error = %e, "Could not count questions"),
    }

    // --- App state ---
    let state = AppState::new(pool, config.clone());

    // --- Session sweeper ---
    let sweeper_cancel = CancellationToken::new();
    let sweeper_handle = tokio::spawn(session_sweeper::run(
        Arc::clone(&state.sessions),
        config.quiz.session_idle_timeout,
        config.quiz.sweep_interval,
        sweeper_cancel.clone(),
    ));

    let app = build_app_router(state, &config);

    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    // The sweeper stops every live session on its way out.
    sweeper_cancel.cancel();
    if tokio::time::timeout(Duration::from_secs(5), sweeper_handle).await.is_err() {
        tracing::warn!("Session sweeper did not stop within 5s");
    }
    tracing::info!("Shutdown complete");
}

/// Wait for SIGINT or SIGTERM (on Unix) to start graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
