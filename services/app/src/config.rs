//! services/app/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which transport backs the session: the canned mock generator or the real
/// backend over HTTP. Selected once at startup; call sites never branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Mock,
    Live,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub transport_mode: TransportMode,
    /// Base URL of the backend API. Required in live mode, unused in mock mode.
    pub backend_url: Option<String>,
    /// Bearer credential forwarded with every live request. Whether it is
    /// present or valid is the auth layer's concern, not ours.
    pub auth_token: Option<String>,
    pub quiz_question_count: usize,
    pub mock_latency: Duration,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let mode_str = std::env::var("TRANSPORT_MODE").unwrap_or_else(|_| "mock".to_string());
        let transport_mode = match mode_str.to_lowercase().as_str() {
            "mock" => TransportMode::Mock,
            "live" => TransportMode::Live,
            other => {
                return Err(ConfigError::InvalidValue(
                    "TRANSPORT_MODE".to_string(),
                    format!("'{}' is not one of 'mock' or 'live'", other),
                ))
            }
        };

        let backend_url = std::env::var("BACKEND_URL").ok();
        if transport_mode == TransportMode::Live && backend_url.is_none() {
            return Err(ConfigError::MissingVar("BACKEND_URL".to_string()));
        }

        let auth_token = std::env::var("AUTH_TOKEN").ok();

        let quiz_question_count = match std::env::var("QUIZ_QUESTION_COUNT") {
            Ok(raw) => raw.parse::<usize>().map_err(|_| {
                ConfigError::InvalidValue(
                    "QUIZ_QUESTION_COUNT".to_string(),
                    format!("'{}' is not a positive integer", raw),
                )
            })?,
            Err(_) => 5,
        };
        if quiz_question_count == 0 {
            return Err(ConfigError::InvalidValue(
                "QUIZ_QUESTION_COUNT".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let mock_latency_ms = match std::env::var("MOCK_LATENCY_MS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(
                    "MOCK_LATENCY_MS".to_string(),
                    format!("'{}' is not a number of milliseconds", raw),
                )
            })?,
            Err(_) => 600,
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            transport_mode,
            backend_url,
            auth_token,
            quiz_question_count,
            mock_latency: Duration::from_millis(mock_latency_ms),
            log_level,
        })
    }
}
