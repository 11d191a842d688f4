use std::time::Duration;

use quizline_core::session::Pacing;

use crate::auth::jwt::JwtConfig;
use crate::auth::password::hash_password;

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Admin token configuration.
    pub jwt: JwtConfig,
    /// Operator credentials and login throttling.
    pub admin: AdminConfig,
    /// Quiz session lifetime and pacing.
    pub quiz: QuizConfig,
}

/// Operator login settings.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Argon2id PHC hash of `ADMIN_PASSWORD`, computed at startup.
    pub password_hash: String,
    /// Delay applied to every failed login (default: 2000 ms).
    pub failed_login_delay: Duration,
    /// Key login throttling on `x-forwarded-for` instead of the socket peer.
    /// Only safe behind a proxy that overwrites the header (default: false).
    pub trust_forwarded_for: bool,
}

/// Quiz session settings.
#[derive(Debug, Clone)]
pub struct QuizConfig {
    /// Sessions with no request for this long are evicted (default: 1800 s).
    pub session_idle_timeout: Duration,
    /// How often idle sessions are swept (default: 60 s).
    pub sweep_interval: Duration,
    pub pacing: Pacing,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            session_idle_timeout: Duration::from_secs(1800),
            sweep_interval: Duration::from_secs(60),
            pacing: Pacing::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                    |
    /// |--------------------------------|----------------------------|
    /// | `HOST`                         | `0.0.0.0`                  |
    /// | `PORT`                         | `3000`                     |
    /// | `CORS_ORIGINS`                 | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`         | `30`                       |
    /// | `ADMIN_PASSWORD`               | required                   |
    /// | `ADMIN_FAILED_LOGIN_DELAY_MS`  | `2000`                     |
    /// | `TRUST_FORWARDED_FOR`          | `false`                    |
    /// | `SESSION_IDLE_TIMEOUT_SECS`    | `1800`                     |
    /// | `SESSION_SWEEP_INTERVAL_SECS`  | `60`                       |
    ///
    /// See [`JwtConfig::from_env`] for the token settings.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = env_u64("REQUEST_TIMEOUT_SECS", 30);

        let admin_password =
            std::env::var("ADMIN_PASSWORD").expect("ADMIN_PASSWORD must be set in the environment");
        assert!(!admin_password.is_empty(), "ADMIN_PASSWORD must not be empty");
        let admin = AdminConfig {
            password_hash: hash_password(&admin_password)
                .expect("Failed to hash ADMIN_PASSWORD"),
            failed_login_delay: Duration::from_millis(env_u64("ADMIN_FAILED_LOGIN_DELAY_MS", 2000)),
            trust_forwarded_for: std::env::var("TRUST_FORWARDED_FOR")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
                .unwrap_or(false),
        };

        let quiz = QuizConfig {
            session_idle_timeout: Duration::from_secs(env_u64("SESSION_IDLE_TIMEOUT_SECS", 1800)),
            sweep_interval: Duration::from_secs(env_u64("SESSION_SWEEP_INTERVAL_SECS", 60)),
            pacing: Pacing::default(),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            admin,
            quiz,
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a valid u64")),
        Err(_) => default,
    }
}
