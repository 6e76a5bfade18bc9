// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fakes shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::clock::{Clock, ManualClock};
use crate::session::{AuthError, SessionToken, TokenProvider, WalletCredentials};
use crate::tier::{KycTierState, KycTiers, Tier, TierLimits, TierResponse, TierService};

/// Fixed test epoch.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

pub fn credentials() -> WalletCredentials {
    WalletCredentials {
        user_id: "user_123".to_string(),
        lifetime_token: "lifetime-token".to_string(),
        guid: "wallet-guid".to_string(),
        email: "alice@example.com".to_string(),
        app_version: "1.0.0".to_string(),
        device_id: "device-1".to_string(),
    }
}

/// Token provider issuing `token-<n>` valid for one hour from the clock.
pub struct FakeTokenProvider {
    clock: Arc<ManualClock>,
    calls: AtomicUsize,
    delay: Mutex<StdDuration>,
    failure: Mutex<Option<AuthError>>,
}

impl FakeTokenProvider {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            clock,
            calls: AtomicUsize::new(0),
            delay: Mutex::new(StdDuration::ZERO),
            failure: Mutex::new(None),
        }
    }

    pub fn with_delay(self, delay: StdDuration) -> Self {
        self.set_delay(delay);
        self
    }

    pub fn set_delay(&self, delay: StdDuration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn fail_with(&self, error: Option<AuthError>) {
        *self.failure.lock().unwrap() = error;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for FakeTokenProvider {
    async fn fetch(&self, credentials: &WalletCredentials) -> Result<SessionToken, AuthError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(SessionToken::new(
            credentials.user_id.clone(),
            format!("token-{n}"),
            self.clock.now() + Duration::hours(1),
        ))
    }
}

/// Tier service answering with a configurable verified tier.
pub struct FakeTierService {
    tier: Mutex<Tier>,
    calls: AtomicUsize,
    delay: Mutex<StdDuration>,
    failure: Mutex<Option<AuthError>>,
    reject_next: AtomicUsize,
}

impl FakeTierService {
    pub fn new(tier: Tier) -> Self {
        Self {
            tier: Mutex::new(tier),
            calls: AtomicUsize::new(0),
            delay: Mutex::new(StdDuration::ZERO),
            failure: Mutex::new(None),
            reject_next: AtomicUsize::new(0),
        }
    }

    pub fn set_tier(&self, tier: Tier) {
        *self.tier.lock().unwrap() = tier;
    }

    pub fn set_delay(&self, delay: StdDuration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn fail_with(&self, error: Option<AuthError>) {
        *self.failure.lock().unwrap() = error;
    }

    /// Answer the next `count` lookups with `Unauthorized`.
    pub fn reject_next(&self, count: usize) {
        self.reject_next.store(count, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Tier list with every level up to `tier` verified.
pub fn tiers_up_to(tier: Tier) -> KycTiers {
    KycTiers {
        tiers: (0..=Tier::MAX.level())
            .map(|index| TierResponse {
                index,
                name: format!("tier-{index}"),
                state: if index > 0 && index <= tier.level() {
                    KycTierState::Verified
                } else {
                    KycTierState::None
                },
                limits: Some(TierLimits {
                    currency: "EUR".to_string(),
                    daily: Some(u64::from(index) * 100_000),
                    annual: None,
                }),
            })
            .collect(),
    }
}

#[async_trait]
impl TierService for FakeTierService {
    async fn fetch_tiers(&self, _token: &SessionToken) -> Result<KycTiers, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Answer with the tier as it was when the request arrived.
        let tier = *self.tier.lock().unwrap();
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let rejected = self
            .reject_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if rejected {
            return Err(AuthError::Unauthorized);
        }
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(tiers_up_to(tier))
    }
}
