// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server configuration loaded from environment variables.

use axum::http::HeaderValue;
use std::env;

const DEFAULT_DATABASE_URL: &str = "sqlite://workouts.db";
const DEFAULT_PORT: u16 = 5000;

/// Allowed CORS origins for the `/api` routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    /// `*`: any origin may call the API.
    Any,
    /// An explicit allow-list.
    List(Vec<HeaderValue>),
}

impl CorsOrigins {
    /// Parse a comma-separated origin list. A bare `*` (or an entry of `*`)
    /// allows everything.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let entries: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if entries.is_empty() || entries.contains(&"*") {
            return Ok(CorsOrigins::Any);
        }

        entries
            .into_iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| ConfigError::Invalid("CORS_ORIGINS", origin.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(CorsOrigins::List)
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL
    pub database_url: String,
    /// Server port
    pub port: u16,
    /// CORS allow-list
    pub cors_origins: CorsOrigins,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            port: DEFAULT_PORT,
            cors_origins: CorsOrigins::Any,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let cors_raw = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            cors_origins: CorsOrigins::parse(&cors_raw)?,
        })
    }

    /// Config used by the integration tests.
    pub fn test_default() -> Self {
        Self::default()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("DATABASE_URL", "sqlite://test.db");
        env::set_var("PORT", "not-a-port");
        env::set_var(
            "CORS_ORIGINS",
            "http://localhost:5173, http://127.0.0.1:5173",
        );

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.database_url, "sqlite://test.db");
        assert_eq!(config.port, 5000);
        assert_eq!(
            config.cors_origins,
            CorsOrigins::List(vec![
                HeaderValue::from_static("http://localhost:5173"),
                HeaderValue::from_static("http://127.0.0.1:5173"),
            ])
        );
    }

    #[test]
    fn test_cors_wildcard() {
        assert_eq!(CorsOrigins::parse("*").unwrap(), CorsOrigins::Any);
        assert_eq!(CorsOrigins::parse("").unwrap(), CorsOrigins::Any);
        assert_eq!(
            CorsOrigins::parse("http://a.example,*").unwrap(),
            CorsOrigins::Any
        );
    }

    #[test]
    fn test_cors_rejects_invalid_header_value() {
        let err = CorsOrigins::parse("http://ok.example,bad\norigin").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("CORS_ORIGINS", _)));
    }
}
