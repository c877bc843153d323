//! Server configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Bind host (from EXERCISE_CATALOG_HOST)
    pub host: String,
    /// Bind port (from EXERCISE_CATALOG_PORT, then PORT)
    pub port: u16,
    /// SQLite file (from EXERCISE_CATALOG_DB). `None` uses the platform data dir.
    pub database_path: Option<PathBuf>,
    /// Allowed CORS origins (from EXERCISE_CATALOG_CORS_ORIGINS, comma-separated).
    /// `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
    /// Bound on each store call (from EXERCISE_CATALOG_REQUEST_TIMEOUT_SECS)
    pub request_timeout: Duration,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup. Unparseable numbers
    /// fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("EXERCISE_CATALOG_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = lookup("EXERCISE_CATALOG_PORT")
            .or_else(|| lookup("PORT"))
            .and_then(|s| s.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let database_path = lookup("EXERCISE_CATALOG_DB")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let cors_origins = lookup("EXERCISE_CATALOG_CORS_ORIGINS").map(|s| {
            s.split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect()
        });

        let request_timeout = lookup("EXERCISE_CATALOG_REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        Self {
            host,
            port,
            database_path,
            cors_origins,
            request_timeout,
        }
    }

    /// Defaults only, ignoring the environment (for local use and tests).
    pub fn local() -> Self {
        Self::from_lookup(|_| None)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// CORS for the read-only API: GET from the configured origins, or from
    /// anywhere when none are configured.
    pub fn cors_layer(&self) -> CorsLayer {
        let Some(origins) = &self.cors_origins else {
            return CorsLayer::permissive();
        };

        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers(Any)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
