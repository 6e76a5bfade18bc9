// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token and the wallet credentials used to obtain one.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Client type header value sent with every token request.
pub const CLIENT_TYPE: &str = "APP";

/// Short-lived credential authenticating calls to the backend.
///
/// Immutable once issued. Superseded (never mutated) on refresh.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    /// Backend user the token was issued for
    pub user_id: String,
    /// Opaque bearer credential
    pub token: String,
    /// Absolute expiry instant
    pub expires_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn new(
        user_id: impl Into<String>,
        token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
            expires_at,
        }
    }

    /// Value for the `authorization` header.
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Whether the token may still be handed out at `now`.
    ///
    /// A token stops being fresh `skew` before its expiry so that a request
    /// started with it does not land at the backend already expired.
    pub fn is_fresh_at(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        now.checked_add_signed(skew)
            .is_some_and(|deadline| deadline < self.expires_at)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Wallet credentials exchanged for a session token.
#[derive(Clone)]
pub struct WalletCredentials {
    /// Backend user id paired with the lifetime token
    pub user_id: String,
    /// Long-lived offline token issued at wallet pairing
    pub lifetime_token: String,
    /// Wallet GUID
    pub guid: String,
    /// Wallet email
    pub email: String,
    /// Client application version
    pub app_version: String,
    /// Stable device identifier
    pub device_id: String,
}

impl fmt::Debug for WalletCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletCredentials")
            .field("user_id", &self.user_id)
            .field("lifetime_token", &"<redacted>")
            .field("guid", &self.guid)
            .field("email", &"<redacted>")
            .field("app_version", &self.app_version)
            .field("device_id", &self.device_id)
            .finish()
    }
}
