//! Startup configuration read from the environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use storytype_narrative::domain::phase::ARC_LENGTH;
use storytype_oracle::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT, OracleSettings};

use crate::error::AppError;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` connection string.
    pub database_url: String,
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Oracle credentials; `None` runs on the fallback banks only.
    pub oracle_api_key: Option<String>,
    /// Oracle API root.
    pub oracle_base_url: String,
    /// Oracle model name.
    pub oracle_model: String,
    /// Upper bound on any single oracle call.
    pub oracle_timeout: Duration,
    /// Questions per fixed-turn run.
    pub arc_length: usize,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when `DATABASE_URL` is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when `DATABASE_URL` is missing or a value
    /// does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = var("DATABASE_URL").ok_or_else(|| {
            AppError::Config("DATABASE_URL environment variable must be set".to_owned())
        })?;
        let timeout_secs: u64 = parse_or(
            var("ORACLE_TIMEOUT_SECS"),
            "ORACLE_TIMEOUT_SECS",
            DEFAULT_TIMEOUT.as_secs(),
        )?;
        let arc_length: usize = parse_or(var("ARC_LENGTH"), "ARC_LENGTH", ARC_LENGTH)?;
        if timeout_secs == 0 {
            return Err(AppError::Config("ORACLE_TIMEOUT_SECS must be positive".to_owned()));
        }
        if arc_length == 0 {
            return Err(AppError::Config("ARC_LENGTH must be positive".to_owned()));
        }

        Ok(Self {
            database_url,
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: parse_or(var("PORT"), "PORT", 3000)?,
            oracle_api_key: var("ORACLE_API_KEY"),
            oracle_base_url: var("ORACLE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            oracle_model: var("ORACLE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            oracle_timeout: Duration::from_secs(timeout_secs),
            arc_length,
        })
    }

    /// The socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an invalid host.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }

    /// Oracle connection settings, when a key is configured.
    #[must_use]
    pub fn oracle_settings(&self) -> Option<OracleSettings> {
        self.oracle_api_key.as_ref().map(|key| OracleSettings {
            api_key: key.clone(),
            base_url: self.oracle_base_url.clone(),
            model: self.oracle_model.clone(),
            request_timeout: self.oracle_timeout,
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} must be a valid number: {e}")))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_apply_when_only_database_url_is_set() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/storytype")]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.oracle_model, DEFAULT_MODEL);
        assert_eq!(config.oracle_timeout, Duration::from_secs(30));
        assert_eq!(config.arc_length, 12);
        assert!(config.oracle_settings().is_none());
    }

    #[test]
    fn test_missing_database_url_is_config_error() {
        let result = config_from(&[("PORT", "8080")]);

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let result = config_from(&[("DATABASE_URL", "postgres://db"), ("PORT", "eighty")]);

        match result.unwrap_err() {
            AppError::Config(message) => assert!(message.contains("PORT")),
            other => panic!("expected Config, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_arc_length_is_config_error() {
        let result = config_from(&[("DATABASE_URL", "postgres://db"), ("ARC_LENGTH", "0")]);

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_oracle_settings_follow_configured_values() {
        // Arrange
        let config = config_from(&[
            ("DATABASE_URL", "postgres://db"),
            ("ORACLE_API_KEY", "sk-test"),
            ("ORACLE_BASE_URL", "http://localhost:9000/v1"),
            ("ORACLE_MODEL", "local-model"),
            ("ORACLE_TIMEOUT_SECS", "5"),
        ])
        .unwrap();

        // Act
        let settings = config.oracle_settings().unwrap();

        // Assert
        assert_eq!(settings.api_key, "sk-test");
        assert_eq!(settings.base_url, "http://localhost:9000/v1");
        assert_eq!(settings.model, "local-model");
        assert_eq!(settings.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_blank_api_key_disables_oracle() {
        let config = config_from(&[("DATABASE_URL", "postgres://db"), ("ORACLE_API_KEY", "  ")])
            .unwrap();

        assert!(config.oracle_settings().is_none());
    }

    #[test]
    fn test_bind_addr_combines_host_and_port() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://db"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8080");
    }
}
