// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors surfaced by the token and tier layers.

use axum::http::StatusCode;

/// Authentication error type.
///
/// Produced by token and tier fetches and fanned out unchanged to every
/// caller that joined the same refresh, hence `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Backend rejected the credentials or session token (HTTP 401/403).
    #[error("Backend rejected the wallet credentials")]
    Unauthorized,

    /// Backend could not be reached.
    #[error("Backend is unreachable: {0}")]
    NetworkUnavailable(String),

    /// Backend answered with a server error or an unreadable body.
    #[error("Backend error: {0}")]
    ServerError(String),
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Unauthorized => "unauthorized",
            AuthError::NetworkUnavailable(_) => "network_unavailable",
            AuthError::ServerError(_) => "server_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::NetworkUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::ServerError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Map a non-success backend HTTP status to an error kind.
    pub fn from_status(status: u16, context: &str) -> Self {
        match status {
            401 | 403 => AuthError::Unauthorized,
            _ => AuthError::ServerError(format!("HTTP {status} from {context}")),
        }
    }
}
