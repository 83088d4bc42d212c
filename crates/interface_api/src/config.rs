//! API configuration
//!
//! Values come from `API_`-prefixed environment variables (`API_PORT`,
//! `API_JWT_SECRET`, ...), after `.env` has been loaded by the binary.
//! `DATABASE_URL` is honoured when `API_DATABASE_URL` is not set.

use std::time::Duration;

use serde::Deserialize;

use core_kernel::{TemporalError, Timezone};
use infra_db::DatabaseConfig;

/// Secret used when none is configured; the server warns about it
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Token lifetime in seconds
    pub jwt_expiration_secs: u64,
    pub database_url: String,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
    /// IANA name of the agency's timezone, used for "today" on renewals
    pub timezone: String,
    /// Front-end directory served with SPA fallback
    pub static_dir: Option<String>,
    pub max_connections: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_expiration_secs: 86_400,
            database_url: "postgres://localhost/rcv".to_string(),
            log_level: "info".to_string(),
            log_json: false,
            timezone: "America/Caracas".to_string(),
            static_dir: None,
            max_connections: 10,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from the environment on top of the defaults
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("jwt_secret", defaults.jwt_secret)?
            .set_default("jwt_expiration_secs", defaults.jwt_expiration_secs as i64)?
            .set_default("database_url", defaults.database_url)?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_json", defaults.log_json)?
            .set_default("timezone", defaults.timezone)?
            .set_default("max_connections", i64::from(defaults.max_connections))?
            .add_source(config::Environment::with_prefix("API"));

        if std::env::var("API_DATABASE_URL").is_err() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                builder = builder.set_override("database_url", url)?;
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The agency timezone
    pub fn timezone(&self) -> Result<Timezone, TemporalError> {
        self.timezone.parse()
    }

    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database_url.clone())
            .max_connections(self.max_connections)
            .connect_timeout(Duration::from_secs(30))
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:3000");
        assert_eq!(config.jwt_expiration_secs, 24 * 60 * 60);
        assert!(config.uses_default_secret());
        assert_eq!(config.timezone().unwrap().name(), "America/Caracas");
    }

    #[test]
    fn test_unknown_timezone_is_rejected() {
        let config = ApiConfig {
            timezone: "Mars/Olympus".into(),
            ..ApiConfig::default()
        };
        assert!(config.timezone().is_err());
    }
}
