// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token caching with single-flight refresh.
//!
//! ## Behaviour
//!
//! - A cached token is served until `expires_at - expiry_skew`
//! - An empty or expired cache triggers exactly one provider call; every
//!   concurrent caller waits for and receives that call's outcome
//! - Failures are not retried here and leave the cache empty
//! - `invalidate()` drops a cached token; it never interrupts a refresh
//!
//! ## Notifications
//!
//! `subscribe()` hands out a broadcast receiver of [`SessionEvent`]s.
//! Dropping the receiver is the only unsubscribe step.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::error::AuthError;
use super::provider::TokenProvider;
use super::token::{SessionToken, WalletCredentials};
use crate::clock::{Clock, SystemClock};
use crate::single_flight::{CellStatus, SingleFlightCell};

/// Default expiry skew (30 seconds).
pub const DEFAULT_EXPIRY_SKEW_SECS: i64 = 30;

/// Buffered session events per subscriber before lagging.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Session lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new token was issued
    Refreshed { expires_at: DateTime<Utc> },
    /// A refresh failed; the cache is empty again
    RefreshFailed(AuthError),
    /// A cached token was discarded
    Invalidated,
}

/// Session token cache.
///
/// Cheap to clone; clones share the same cache and refresh.
#[derive(Clone)]
pub struct SessionTokenCache {
    /// Remote token exchange
    provider: Arc<dyn TokenProvider>,
    /// Credentials presented on every exchange
    credentials: Arc<WalletCredentials>,
    /// Time source for expiry checks
    clock: Arc<dyn Clock>,
    /// Safety margin before `expires_at`
    expiry_skew: Duration,
    /// Cached token
    cell: SingleFlightCell<SessionToken>,
    /// Lifecycle notifications
    events: broadcast::Sender<SessionEvent>,
}

impl SessionTokenCache {
    /// Create a new cache around a token provider.
    pub fn new(provider: Arc<dyn TokenProvider>, credentials: WalletCredentials) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            provider,
            credentials: Arc::new(credentials),
            clock: Arc::new(SystemClock),
            expiry_skew: Duration::seconds(DEFAULT_EXPIRY_SKEW_SECS),
            cell: SingleFlightCell::new(),
            events,
        }
    }

    /// Create with custom expiry skew.
    pub fn with_expiry_skew(mut self, skew: Duration) -> Self {
        self.expiry_skew = skew;
        self
    }

    /// Create with a custom time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Get a valid session token, refreshing it if needed.
    pub async fn get_token(&self) -> Result<SessionToken, AuthError> {
        let now = self.clock.now();
        let skew = self.expiry_skew;
        let provider = Arc::clone(&self.provider);
        let credentials = Arc::clone(&self.credentials);
        let events = self.events.clone();

        self.cell
            .get_or_refresh(
                |token| token.is_fresh_at(now, skew),
                move || async move {
                    debug!(user_id = %credentials.user_id, "Refreshing session token");
                    let result = provider.fetch(&credentials).await;
                    match &result {
                        Ok(token) => {
                            info!(
                                user_id = %token.user_id,
                                expires_at = %token.expires_at,
                                "Session token refreshed"
                            );
                            let _ = events.send(SessionEvent::Refreshed {
                                expires_at: token.expires_at,
                            });
                        }
                        Err(e) => {
                            warn!(error = %e, error_code = e.error_code(), "Session token refresh failed");
                            let _ = events.send(SessionEvent::RefreshFailed(e.clone()));
                        }
                    }
                    result
                },
            )
            .await
    }

    /// Force the next `get_token` to fetch a new token.
    ///
    /// No-op while a refresh is in flight.
    pub fn invalidate(&self) {
        if self.cell.invalidate() {
            debug!("Session token invalidated");
            let _ = self.events.send(SessionEvent::Invalidated);
        }
    }

    /// Drop the cached token only if it is still `rejected`.
    ///
    /// A token that replaced the rejected one in the meantime is kept.
    pub fn invalidate_rejected(&self, rejected: &SessionToken) {
        if self.cell.invalidate_if(|cached| cached == rejected) {
            debug!("Rejected session token invalidated");
            let _ = self.events.send(SessionEvent::Invalidated);
        }
    }

    /// Check if a token is currently cached and fresh.
    pub fn is_cached(&self) -> bool {
        self.cell
            .peek()
            .map(|token| token.is_fresh_at(self.clock.now(), self.expiry_skew))
            .unwrap_or(false)
    }

    pub fn status(&self) -> CellStatus {
        self.cell.status()
    }

    /// Subscribe to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}
