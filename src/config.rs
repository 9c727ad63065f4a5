// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

//! # Runtime Configuration
//!
//! Configuration is read from the environment exactly once at startup
//! (`Config::from_env` in `main.rs`) and injected into each component's
//! constructor. Business logic never reads the environment itself.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LEDGER_PATH` | Path of the embedded ledger database | `/data/mintgate.redb` |
//! | `EVENTS_PATH` | JSON file of mint events seeded at startup | Optional |
//! | `SPONSOR_URL` | Transaction sponsor endpoint | Required |
//! | `SPONSOR_DEADLINE_SECS` | Hard deadline for a sponsor call | `30` |
//! | `WALRUS_PUBLISHER_URL` | Walrus publisher base URL | Required |
//! | `WALRUS_AGGREGATOR_URL` | Walrus aggregator base URL | Required |
//! | `WALRUS_DEFAULT_EPOCHS` | Retention fallback when caller gives none | `5` |
//! | `WALRUS_MAX_BLOB_BYTES` | Local upload size ceiling | `10485760` |
//! | `UPLOAD_TOKEN_SECRET` | HS256 secret for the blob ingestion JWT | Optional (uploads fail closed) |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::time::Duration;

use crate::walrus::RetentionPolicy;

const DEFAULT_LEDGER_PATH: &str = "/data/mintgate.redb";
const DEFAULT_SPONSOR_DEADLINE_SECS: u64 = 30;
const DEFAULT_WALRUS_EPOCHS: u64 = 5;
const DEFAULT_MAX_BLOB_BYTES: usize = 10 * 1024 * 1024;

/// Error raised when required configuration is missing or malformed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(String),

    #[error("invalid value for {name}: {message}")]
    Invalid { name: String, message: String },
}

/// Sponsor delegation settings.
#[derive(Debug, Clone)]
pub struct SponsorConfig {
    /// Base URL of the transaction-sponsoring service.
    pub endpoint: String,
    /// Hard deadline for a single sponsor call. Must stay below the
    /// platform request budget so a timeout resolves to a clean error.
    pub deadline: Duration,
}

/// Walrus blob store settings.
#[derive(Debug, Clone)]
pub struct WalrusConfig {
    /// Publisher base URL (writes).
    pub publisher_url: String,
    /// Aggregator base URL (reads).
    pub aggregator_url: String,
    /// Retention applied when the caller supplies none. The backend's own
    /// default is its least durable policy, so one is always sent upstream.
    pub default_retention: RetentionPolicy,
    /// Upload size ceiling, enforced locally before any round trip.
    pub max_blob_bytes: usize,
    /// Store attempts against retryable failures.
    pub store_attempts: u32,
    /// Base delay of the exponential backoff between attempts.
    pub retry_base_delay: Duration,
    /// Per-attempt deadline, below the overall operation budget.
    pub attempt_timeout: Duration,
}

/// Application configuration, constructed once at process start.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub ledger_path: PathBuf,
    pub events_path: Option<PathBuf>,
    pub sponsor: SponsorConfig,
    pub walrus: WalrusConfig,
    /// HS256 secret guarding blob ingestion. Absent means uploads are
    /// rejected with 401.
    pub upload_token_secret: Option<String>,
    pub log_json: bool,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or_default("HOST", "0.0.0.0");
        let port = parse_env("PORT", 8080u16)?;

        let ledger_path = PathBuf::from(env_or_default("LEDGER_PATH", DEFAULT_LEDGER_PATH));
        let events_path = env_optional("EVENTS_PATH").map(PathBuf::from);

        let sponsor = SponsorConfig {
            endpoint: required_url("SPONSOR_URL")?,
            deadline: Duration::from_secs(parse_env(
                "SPONSOR_DEADLINE_SECS",
                DEFAULT_SPONSOR_DEADLINE_SECS,
            )?),
        };

        let walrus = WalrusConfig {
            publisher_url: required_url("WALRUS_PUBLISHER_URL")?,
            aggregator_url: required_url("WALRUS_AGGREGATOR_URL")?,
            default_retention: RetentionPolicy::Epochs(parse_env(
                "WALRUS_DEFAULT_EPOCHS",
                DEFAULT_WALRUS_EPOCHS,
            )?),
            max_blob_bytes: parse_env("WALRUS_MAX_BLOB_BYTES", DEFAULT_MAX_BLOB_BYTES)?,
            store_attempts: 3,
            retry_base_delay: Duration::from_millis(250),
            attempt_timeout: Duration::from_secs(15),
        };

        Ok(Self {
            host,
            port,
            ledger_path,
            events_path,
            sponsor,
            walrus,
            upload_token_secret: env_optional("UPLOAD_TOKEN_SECRET"),
            log_json: env_or_default("LOG_FORMAT", "pretty") == "json",
        })
    }
}

fn env_optional(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) => {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

fn env_required(name: &str) -> Result<String, ConfigError> {
    env_optional(name).ok_or_else(|| ConfigError::Missing(name.to_string()))
}

fn env_or_default(name: &str, default: &str) -> String {
    env_optional(name).unwrap_or_else(|| default.to_string())
}

/// Required variable that must also parse as an absolute URL.
fn required_url(name: &str) -> Result<String, ConfigError> {
    let raw = env_required(name)?;
    url::Url::parse(&raw).map_err(|e| ConfigError::Invalid {
        name: name.to_string(),
        message: e.to_string(),
    })?;
    Ok(raw)
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env_optional(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name: name.to_string(),
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_default_falls_back() {
        assert_eq!(env_or_default("MINTGATE_TEST_UNSET_VAR", "x"), "x");
    }

    #[test]
    fn parse_env_uses_default_when_unset() {
        let port: u16 = parse_env("MINTGATE_TEST_UNSET_PORT", 8080).unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn env_required_reports_missing_name() {
        let err = env_required("MINTGATE_TEST_UNSET_REQUIRED").unwrap_err();
        assert!(matches!(err, ConfigError::Missing(name) if name == "MINTGATE_TEST_UNSET_REQUIRED"));
    }

    #[test]
    fn required_url_rejects_non_urls() {
        // Env mutation is process-global; use a name no other test touches.
        std::env::set_var("MINTGATE_TEST_BAD_URL", "not a url");
        let err = required_url("MINTGATE_TEST_BAD_URL").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name, .. } if name == "MINTGATE_TEST_BAD_URL"));
        std::env::remove_var("MINTGATE_TEST_BAD_URL");
    }
}
