// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Backend HTTP Adapters
//!
//! reqwest-based implementations of the remote collaborators:
//!
//! - [`BackendClient`] implements `TokenProvider` (`POST auth`) and
//!   `TierService` (`GET kyc/tiers`)
//! - [`HttpRolloutFlags`] implements `RolloutFlagSource`
//!
//! ## Error Mapping
//!
//! | Condition | Error |
//! |-----------|-------|
//! | HTTP 401 / 403 | `AuthError::Unauthorized` |
//! | Any other non-2xx | `AuthError::ServerError` |
//! | Connect / timeout / transport failure | `AuthError::NetworkUnavailable` |
//! | Undecodable body | `AuthError::ServerError` |

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ConfigError;
use crate::session::AuthError;

pub mod rollout;
pub mod tiers;
pub mod token;

pub use rollout::HttpRolloutFlags;

/// Backend API client.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: Url,
    http: reqwest::Client,
}

impl BackendClient {
    /// Create a client rooted at `base_url`.
    ///
    /// A missing trailing slash is added so relative endpoint paths resolve
    /// beneath the base path.
    pub fn new(mut base_url: Url, timeout: Duration) -> Result<Self, ConfigError> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { base_url, http })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.base_url
            .join(path)
            .map_err(|e| AuthError::ServerError(format!("invalid endpoint {path}: {e}")))
    }
}

/// Map a transport failure.
fn transport_error(e: reqwest::Error) -> AuthError {
    AuthError::NetworkUnavailable(e.to_string())
}

/// Check the status and decode a JSON body.
async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    context: &str,
) -> Result<T, AuthError> {
    let status = response.status();
    if !status.is_success() {
        return Err(AuthError::from_status(status.as_u16(), context));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| AuthError::ServerError(format!("invalid {context} response: {e}")))
}
