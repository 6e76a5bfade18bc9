// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token provider contract.

use async_trait::async_trait;

use super::error::AuthError;
use super::token::{SessionToken, WalletCredentials};

/// Performs one remote exchange of wallet credentials for a session token.
///
/// Implementations must not cache or retry; `SessionTokenCache` owns both.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn fetch(&self, credentials: &WalletCredentials) -> Result<SessionToken, AuthError>;
}
