// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATABASE_PATH` | redb database file | `./data/dapp0.redb` |
//! | `SESSION_SECRET` | HS256 key for session tokens (≥ 32 bytes) | Required (random in `dev` builds) |
//! | `SESSION_TTL_SECS` | Session lifetime | `86400` |
//! | `SESSION_ISSUER` | `iss` claim of session tokens | `dapp0` |
//! | `NONCE_TTL_SECS` | Sign-in nonce lifetime | `300` |
//! | `NONCE_SWEEP_INTERVAL_SECS` | Expired nonce purge interval | `60` |
//! | `V0_API_KEY` | Bearer key of the generation backend | Optional (fallback only) |
//! | `V0_API_BASE_URL` | Generation backend base URL | `https://mcp.v0.dev` |
//! | `GENERATION_TIMEOUT_SECS` | Upstream generation timeout | `60` |
//! | `GITHUB_API_BASE_URL` | GitHub REST API base URL | `https://api.github.com` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; both set enables HTTPS | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const DEFAULT_DATABASE_PATH: &str = "./data/dapp0.redb";
pub const DEFAULT_V0_API_BASE_URL: &str = "https://mcp.v0.dev";
pub const DEFAULT_GITHUB_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_SESSION_ISSUER: &str = "dapp0";
pub const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// TLS certificate and key locations.
#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Settings of the upstream code generator.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub base_url: Url,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub session_secret: Vec<u8>,
    pub session_issuer: String,
    pub session_ttl: Duration,
    pub nonce_ttl: Duration,
    pub nonce_sweep_interval: Duration,
    pub generation: GenerationConfig,
    pub github_api_base_url: Url,
    pub tls: Option<TlsPaths>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_path", &self.database_path)
            .field("session_issuer", &self.session_issuer)
            .field("session_ttl", &self.session_ttl)
            .field("nonce_ttl", &self.nonce_ttl)
            .field("generation_base_url", &self.generation.base_url.as_str())
            .field("generation_configured", &self.generation.api_key.is_some())
            .field("github_api_base_url", &self.github_api_base_url.as_str())
            .field("tls", &self.tls.is_some())
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(get("PORT"), "PORT", "a port number", 8080u16)?;
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|_| ConfigError::Invalid {
                    name: "HOST",
                    expected: "an IP address",
                    value: host.clone(),
                })?;

        let session_secret = match get("SESSION_SECRET") {
            Some(secret) if secret.len() >= MIN_SESSION_SECRET_LEN => secret.into_bytes(),
            Some(secret) => {
                return Err(ConfigError::Invalid {
                    name: "SESSION_SECRET",
                    expected: "at least 32 bytes",
                    value: format!("<{} bytes>", secret.len()),
                })
            }
            None => missing_session_secret()?,
        };

        let tls = match (get("TLS_CERT_PATH"), get("TLS_KEY_PATH")) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("TLS_KEY_PATH")),
            (None, Some(_)) => return Err(ConfigError::Missing("TLS_CERT_PATH")),
        };

        Ok(Self {
            bind_addr,
            database_path: get("DATABASE_PATH")
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string())
                .into(),
            session_secret,
            session_issuer: get("SESSION_ISSUER").unwrap_or_else(|| DEFAULT_SESSION_ISSUER.to_string()),
            session_ttl: secs(get("SESSION_TTL_SECS"), "SESSION_TTL_SECS", 86_400)?,
            nonce_ttl: secs(get("NONCE_TTL_SECS"), "NONCE_TTL_SECS", 300)?,
            nonce_sweep_interval: secs(
                get("NONCE_SWEEP_INTERVAL_SECS"),
                "NONCE_SWEEP_INTERVAL_SECS",
                60,
            )?,
            generation: GenerationConfig {
                api_key: get("V0_API_KEY"),
                base_url: url(get("V0_API_BASE_URL"), "V0_API_BASE_URL", DEFAULT_V0_API_BASE_URL)?,
                timeout: secs(get("GENERATION_TIMEOUT_SECS"), "GENERATION_TIMEOUT_SECS", 60)?,
            },
            github_api_base_url: url(
                get("GITHUB_API_BASE_URL"),
                "GITHUB_API_BASE_URL",
                DEFAULT_GITHUB_API_BASE_URL,
            )?,
            tls,
        })
    }
}

#[cfg(not(feature = "dev"))]
fn missing_session_secret() -> Result<Vec<u8>, ConfigError> {
    Err(ConfigError::Missing("SESSION_SECRET"))
}

/// Development builds fall back to a per-process secret; sessions do not
/// survive a restart.
#[cfg(feature = "dev")]
fn missing_session_secret() -> Result<Vec<u8>, ConfigError> {
    use rand::RngCore;

    tracing::warn!("SESSION_SECRET not set; using a random secret (dev build)");
    let mut secret = vec![0u8; 64];
    rand::thread_rng().fill_bytes(&mut secret);
    Ok(secret)
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value: raw,
        }),
    }
}

fn secs(value: Option<String>, name: &'static str, default: u64) -> Result<Duration, ConfigError> {
    parse_or(value, name, "a whole number of seconds", default).map(Duration::from_secs)
}

fn url(value: Option<String>, name: &'static str, default: &str) -> Result<Url, ConfigError> {
    let raw = value.unwrap_or_else(|| default.to_string());
    match Url::parse(&raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(parsed),
        _ => Err(ConfigError::Invalid {
            name,
            expected: "an http(s) URL",
            value: raw,
        }),
    }
}
