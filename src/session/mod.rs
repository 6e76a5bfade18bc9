// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Module
//!
//! Backend session handling for the Relational wallet.
//!
//! ## Token Flow
//!
//! 1. Wallet pairing yields long-lived credentials (user id + lifetime token)
//! 2. `TokenProvider` exchanges them for a short-lived session token
//! 3. `SessionTokenCache` holds the token and refreshes it on expiry,
//!    with at most one exchange in flight at a time
//! 4. Callers attach `SessionToken::auth_header()` to backend requests
//!
//! ## Error Model
//!
//! Every failure is an [`AuthError`]: `Unauthorized`, `NetworkUnavailable`
//! or `ServerError`. Nothing in this module retries.

pub mod cache;
pub mod error;
pub mod provider;
pub mod token;

pub use cache::{SessionEvent, SessionTokenCache};
pub use error::AuthError;
pub use provider::TokenProvider;
pub use token::{SessionToken, WalletCredentials};
