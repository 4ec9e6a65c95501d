//! services/planner/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use lesson_planner_core::Locale;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub gemini_api_base: String,
    pub gemini_model: String,
    pub gemini_timeout_secs: u64,
    /// Where the single API credential is persisted between runs.
    pub credential_path: PathBuf,
    pub default_locale: Locale,
    pub allowed_origin: String,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        // --- Server Settings ---
        let bind_address: SocketAddr = parse_var("BIND_ADDRESS", &var_or("BIND_ADDRESS", "127.0.0.1:3000"))?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let allowed_origin = var_or("ALLOWED_ORIGIN", "http://localhost:5173");
        let max_upload_bytes: usize = parse_var(
            "MAX_UPLOAD_BYTES",
            &var_or("MAX_UPLOAD_BYTES", &(20 * 1024 * 1024).to_string()),
        )?;

        // --- Generation Service Settings ---
        let gemini_api_base = var_or(
            "GEMINI_API_BASE",
            "https://generativelanguage.googleapis.com/v1beta",
        );
        let gemini_model = var_or("GEMINI_MODEL", "gemini-2.5-flash");
        if gemini_model.trim().is_empty() {
            return Err(ConfigError::MissingVar("GEMINI_MODEL".to_string()));
        }
        let gemini_timeout_secs: u64 =
            parse_var("GEMINI_TIMEOUT_SECS", &var_or("GEMINI_TIMEOUT_SECS", "120"))?;

        // --- Session Settings ---
        let credential_path = PathBuf::from(var_or("CREDENTIAL_PATH", "./.lesson_planner/api_key"));
        let default_locale = var_or("DEFAULT_LOCALE", "vi")
            .parse::<Locale>()
            .map_err(|e| ConfigError::InvalidValue("DEFAULT_LOCALE".to_string(), e.to_string()))?;

        Ok(Self {
            bind_address,
            log_level,
            gemini_api_base,
            gemini_model,
            gemini_timeout_secs,
            credential_path,
            default_locale,
            allowed_origin,
            max_upload_bytes,
        })
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_address.to_string(), "127.0.0.1:3000");
        assert_eq!(config.gemini_model, "gemini-2.5-flash");
        assert_eq!(config.default_locale, Locale::Vi);
        assert_eq!(config.gemini_timeout_secs, 120);
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("BIND_ADDRESS", "0.0.0.0:8080"),
            ("DEFAULT_LOCALE", "en"),
            ("MAX_UPLOAD_BYTES", "1024"),
            ("RUST_LOG", "debug"),
        ])
        .unwrap();
        assert_eq!(config.bind_address.port(), 8080);
        assert_eq!(config.default_locale, Locale::En);
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn invalid_values_are_reported_by_name() {
        let err = config_from(&[("BIND_ADDRESS", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "BIND_ADDRESS"));

        let err = config_from(&[("DEFAULT_LOCALE", "fr")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "DEFAULT_LOCALE"));
    }
}
