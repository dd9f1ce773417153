/**
 * Server Configuration
 *
 * Loads the server configuration from environment variables (a `.env` file
 * is read by `main` before this runs) and opens the optional PostgreSQL pool.
 *
 * # Variables
 *
 * - `DATABASE_URL` - optional; without it store-backed routes answer 503
 * - `JWT_SECRET`, `REFRESH_TOKEN_SECRET` - required, must differ
 * - `JWT_EXPIRES_IN` (default `15m`), `REFRESH_TOKEN_EXPIRES_IN` (default `7d`)
 * - `SERVER_PORT` (default 5000), `FRONTEND_URL`, `APP_ENV`
 * - `EVENT_HISTORY_CAPACITY` (default 500)
 *
 * # Error Handling
 *
 * A missing or unreachable database is logged and the server starts without
 * it. Missing secrets or malformed values fail startup with `ConfigError`.
 */

use chrono::Duration;
use sqlx::PgPool;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_ACCESS_TTL: &str = "15m";
pub const DEFAULT_REFRESH_TTL: &str = "7d";
pub const DEFAULT_HISTORY_CAPACITY: usize = 500;

/// Startup configuration failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Database configuration result
///
/// `None` when the database is not configured or unreachable.
pub type DatabaseConfig = Option<PgPool>;

/// Process-wide settings, parsed once at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub refresh_token_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub port: u16,
    pub frontend_url: Option<String>,
    /// `APP_ENV`, `development` unless set
    pub environment: String,
    pub event_history_capacity: usize,
}

impl ServerConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let jwt_secret = var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let refresh_token_secret =
            var("REFRESH_TOKEN_SECRET").ok_or(ConfigError::Missing("REFRESH_TOKEN_SECRET"))?;

        let access_raw = var("JWT_EXPIRES_IN").unwrap_or_else(|| DEFAULT_ACCESS_TTL.into());
        let access_token_ttl = parse_duration(&access_raw).ok_or(ConfigError::Invalid {
            name: "JWT_EXPIRES_IN",
            value: access_raw.clone(),
        })?;

        let refresh_raw =
            var("REFRESH_TOKEN_EXPIRES_IN").unwrap_or_else(|| DEFAULT_REFRESH_TTL.into());
        let refresh_token_ttl = parse_duration(&refresh_raw).ok_or(ConfigError::Invalid {
            name: "REFRESH_TOKEN_EXPIRES_IN",
            value: refresh_raw.clone(),
        })?;

        let port = match var("SERVER_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "SERVER_PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let event_history_capacity = match var("EVENT_HISTORY_CAPACITY") {
            Some(raw) => raw
                .trim()
                .parse()
                .ok()
                .filter(|n: &usize| *n > 0)
                .ok_or(ConfigError::Invalid {
                    name: "EVENT_HISTORY_CAPACITY",
                    value: raw,
                })?,
            None => DEFAULT_HISTORY_CAPACITY,
        };

        Ok(Self {
            database_url: var("DATABASE_URL"),
            jwt_secret,
            refresh_token_secret,
            access_token_ttl,
            refresh_token_ttl,
            port,
            frontend_url: var("FRONTEND_URL"),
            environment: var("APP_ENV").unwrap_or_else(|| "development".into()),
            event_history_capacity,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

/// Parse `900`, `30s`, `15m`, `12h` or `7d` into a duration
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last()? {
        (i, c) if c.is_ascii_alphabetic() => (&raw[..i], c.to_ascii_lowercase()),
        _ => (raw, 's'),
    };
    let n: i64 = digits.trim().parse().ok()?;
    if n <= 0 {
        return None;
    }
    match unit {
        's' => Some(Duration::seconds(n)),
        'm' => Some(Duration::minutes(n)),
        'h' => Some(Duration::hours(n)),
        'd' => Some(Duration::days(n)),
        _ => None,
    }
}

/// Open the PostgreSQL pool and run migrations
///
/// Returns `None` when `DATABASE_URL` is unset or the connection fails; the
/// server then runs without database features.
pub async fn load_database(config: &ServerConfig) -> DatabaseConfig {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set. Database features will be disabled.");
        return None;
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Database features will be disabled.");
            return None;
        }
    };

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => tracing::info!("Database migrations completed successfully"),
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}
