// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Diagnostics server bind address | `127.0.0.1` |
//! | `PORT` | Diagnostics server bind port | `8080` |
//! | `BACKEND_URL` | Base URL of the wallet backend API | Required |
//! | `WALLET_USER_ID` | Backend user id paired with the wallet | Required |
//! | `WALLET_LIFETIME_TOKEN` | Long-lived offline token | Required |
//! | `WALLET_GUID` | Wallet GUID | Required |
//! | `WALLET_EMAIL` | Wallet email | Required |
//! | `APP_VERSION` | Client version reported to the backend | crate version |
//! | `DEVICE_ID` | Device identifier reported to the backend | random UUID |
//! | `BUILD_KIND` | `internal` or `release` | `release` |
//! | `TOKEN_EXPIRY_SKEW_SECS` | Seconds before expiry a token is refreshed (max 3600) | `30` |
//! | `TIER_CACHE_TTL_SECS` | Seconds a resolved KYC tier is cached (max 86400) | `300` |
//! | `ROLLOUT_FLAGS_URL` | Remote rollout flag document | Optional |
//! | `ROLLOUT_CACHE_TTL_SECS` | Seconds rollout flags are cached | `60` |
//! | `HTTP_TIMEOUT_SECS` | Backend request timeout | `10` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::time::Duration;

use url::Url;
use uuid::Uuid;

use crate::access::AccessGate;
use crate::backend::{BackendClient, HttpRolloutFlags};
use crate::flags::{BuildKind, InternalFeatureFlagRegistry, RolloutFlagSource, StaticRolloutFlags};
use crate::session::cache::DEFAULT_EXPIRY_SKEW_SECS;
use crate::session::{SessionTokenCache, WalletCredentials};
use crate::state::AppState;
use crate::tier::resolver::DEFAULT_TIER_CACHE_TTL_SECS;
use crate::tier::TierResolver;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const BACKEND_URL_ENV: &str = "BACKEND_URL";
pub const WALLET_USER_ID_ENV: &str = "WALLET_USER_ID";
pub const WALLET_LIFETIME_TOKEN_ENV: &str = "WALLET_LIFETIME_TOKEN";
pub const WALLET_GUID_ENV: &str = "WALLET_GUID";
pub const WALLET_EMAIL_ENV: &str = "WALLET_EMAIL";
pub const APP_VERSION_ENV: &str = "APP_VERSION";
pub const DEVICE_ID_ENV: &str = "DEVICE_ID";
pub const BUILD_KIND_ENV: &str = "BUILD_KIND";
pub const TOKEN_EXPIRY_SKEW_ENV: &str = "TOKEN_EXPIRY_SKEW_SECS";
pub const TIER_CACHE_TTL_ENV: &str = "TIER_CACHE_TTL_SECS";
pub const ROLLOUT_FLAGS_URL_ENV: &str = "ROLLOUT_FLAGS_URL";
pub const ROLLOUT_CACHE_TTL_ENV: &str = "ROLLOUT_CACHE_TTL_SECS";
pub const HTTP_TIMEOUT_ENV: &str = "HTTP_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ROLLOUT_CACHE_TTL_SECS: u64 = 60;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
/// Upper bound for `TOKEN_EXPIRY_SKEW_SECS` (1 hour).
const MAX_EXPIRY_SKEW_SECS: i64 = 3_600;
/// Upper bound for `TIER_CACHE_TTL_SECS` (1 day).
const MAX_TIER_CACHE_TTL_SECS: i64 = 86_400;

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub bind_addr: SocketAddr,
    pub backend_url: Url,
    pub credentials: WalletCredentials,
    pub build: BuildKind,
    pub token_expiry_skew: chrono::Duration,
    pub tier_cache_ttl: chrono::Duration,
    pub rollout_flags_url: Option<Url>,
    pub rollout_cache_ttl: Duration,
    pub http_timeout: Duration,
}

impl SessionConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let host = optional(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(optional(PORT_ENV), PORT_ENV, DEFAULT_PORT)?;
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    name: HOST_ENV,
                    reason: e.to_string(),
                })?;

        let backend_url = parse_url(BACKEND_URL_ENV, &required(BACKEND_URL_ENV)?)?;
        let rollout_flags_url = optional(ROLLOUT_FLAGS_URL_ENV)
            .map(|raw| parse_url(ROLLOUT_FLAGS_URL_ENV, &raw))
            .transpose()?;

        let credentials = WalletCredentials {
            user_id: required(WALLET_USER_ID_ENV)?,
            lifetime_token: required(WALLET_LIFETIME_TOKEN_ENV)?,
            guid: required(WALLET_GUID_ENV)?,
            email: required(WALLET_EMAIL_ENV)?,
            app_version: optional(APP_VERSION_ENV)
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            device_id: optional(DEVICE_ID_ENV).unwrap_or_else(|| Uuid::new_v4().to_string()),
        };

        let build = match optional(BUILD_KIND_ENV) {
            Some(raw) => BuildKind::parse(&raw).ok_or_else(|| ConfigError::Invalid {
                name: BUILD_KIND_ENV,
                reason: format!("expected 'internal' or 'release', got '{raw}'"),
            })?,
            None => BuildKind::default(),
        };

        let token_expiry_skew = parse_bounded_secs(
            optional(TOKEN_EXPIRY_SKEW_ENV),
            TOKEN_EXPIRY_SKEW_ENV,
            DEFAULT_EXPIRY_SKEW_SECS,
            MAX_EXPIRY_SKEW_SECS,
        )?;
        let tier_cache_ttl = parse_bounded_secs(
            optional(TIER_CACHE_TTL_ENV),
            TIER_CACHE_TTL_ENV,
            DEFAULT_TIER_CACHE_TTL_SECS,
            MAX_TIER_CACHE_TTL_SECS,
        )?;

        Ok(Self {
            bind_addr,
            backend_url,
            credentials,
            build,
            token_expiry_skew,
            tier_cache_ttl,
            rollout_flags_url,
            rollout_cache_ttl: Duration::from_secs(parse_or(
                optional(ROLLOUT_CACHE_TTL_ENV),
                ROLLOUT_CACHE_TTL_ENV,
                DEFAULT_ROLLOUT_CACHE_TTL_SECS,
            )?),
            http_timeout: Duration::from_secs(parse_or(
                optional(HTTP_TIMEOUT_ENV),
                HTTP_TIMEOUT_ENV,
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
        })
    }

    /// Wire the session, tier and access components for this configuration.
    pub fn build_state(&self) -> Result<AppState, ConfigError> {
        let backend = std::sync::Arc::new(BackendClient::new(
            self.backend_url.clone(),
            self.http_timeout,
        )?);

        let session = SessionTokenCache::new(backend.clone(), self.credentials.clone())
            .with_expiry_skew(self.token_expiry_skew);
        let tiers = TierResolver::new(session, backend).with_cache_ttl(self.tier_cache_ttl);

        let rollout: std::sync::Arc<dyn RolloutFlagSource> = match &self.rollout_flags_url {
            Some(url) => std::sync::Arc::new(
                HttpRolloutFlags::new(url.clone(), self.http_timeout)?
                    .with_cache_ttl(self.rollout_cache_ttl),
            ),
            None => std::sync::Arc::new(StaticRolloutFlags::unavailable()),
        };

        let flags = std::sync::Arc::new(InternalFeatureFlagRegistry::new(self.build));
        Ok(AppState::new(AccessGate::new(flags, tiers, rollout)))
    }
}

/// Log format from `LOG_FORMAT`; anything but `json` is pretty.
pub fn log_format_from_env() -> LogFormat {
    match std::env::var(LOG_FORMAT_ENV) {
        Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
        _ => LogFormat::Pretty,
    }
}

fn parse_or<T>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Parse a whole number of seconds in `0..=max`.
fn parse_bounded_secs(
    raw: Option<String>,
    name: &'static str,
    default: i64,
    max: i64,
) -> Result<chrono::Duration, ConfigError> {
    let secs: i64 = parse_or(raw, name, default)?;
    if !(0..=max).contains(&secs) {
        return Err(ConfigError::Invalid {
            name,
            reason: format!("must be between 0 and {max} seconds, got {secs}"),
        });
    }
    chrono::Duration::try_seconds(secs).ok_or_else(|| ConfigError::Invalid {
        name,
        reason: format!("{secs} seconds is out of range"),
    })
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            name,
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
