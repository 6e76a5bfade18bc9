// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! KYC tier resolution with caching.
//!
//! The resolved tier is cached for `cache_ttl` and refreshed through the
//! same single-flight discipline as the session token: concurrent callers
//! share one backend lookup and its outcome.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use super::model::ResolvedTier;
use super::service::TierService;
use crate::clock::{Clock, SystemClock};
use crate::session::{AuthError, SessionTokenCache};
use crate::single_flight::{CellStatus, SingleFlightCell};

/// Default tier cache TTL (5 minutes).
pub const DEFAULT_TIER_CACHE_TTL_SECS: i64 = 300;

#[derive(Clone)]
struct CachedTier {
    resolved: ResolvedTier,
    fetched_at: DateTime<Utc>,
}

/// Tier resolver.
///
/// Cheap to clone; clones share the same cache.
#[derive(Clone)]
pub struct TierResolver {
    session: SessionTokenCache,
    service: Arc<dyn TierService>,
    clock: Arc<dyn Clock>,
    cache_ttl: Duration,
    cell: SingleFlightCell<CachedTier>,
}

impl TierResolver {
    pub fn new(session: SessionTokenCache, service: Arc<dyn TierService>) -> Self {
        Self {
            session,
            service,
            clock: Arc::new(SystemClock),
            cache_ttl: Duration::seconds(DEFAULT_TIER_CACHE_TTL_SECS),
            cell: SingleFlightCell::new(),
        }
    }

    /// Create with custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Create with a custom time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Session cache used to authenticate tier lookups.
    pub fn session(&self) -> &SessionTokenCache {
        &self.session
    }

    /// Current verification tier of the user.
    pub async fn current_tier(&self) -> Result<ResolvedTier, AuthError> {
        let now = self.clock.now();
        let ttl = self.cache_ttl;
        let session = self.session.clone();
        let service = Arc::clone(&self.service);
        let clock = Arc::clone(&self.clock);

        let cached = self
            .cell
            .get_or_refresh(
                |cached| now - cached.fetched_at < ttl,
                move || async move {
                    let token = session.get_token().await?;
                    let tiers = service.fetch_tiers(&token).await.inspect_err(|e| {
                        warn!(error = %e, error_code = e.error_code(), "KYC tier lookup failed");
                        if *e == AuthError::Unauthorized {
                            session.invalidate_rejected(&token);
                        }
                    })?;
                    let resolved = tiers.resolve();
                    info!(
                        tier = %resolved.tier,
                        pending = ?resolved.pending,
                        "KYC tier resolved"
                    );
                    Ok(CachedTier {
                        resolved,
                        fetched_at: clock.now(),
                    })
                },
            )
            .await?;

        Ok(cached.resolved)
    }

    /// Force the next `current_tier` to re-fetch, e.g. after the user
    /// completes another verification step.
    ///
    /// A lookup already in flight may predate the change, so its result
    /// still answers its current waiters but is not cached.
    pub fn invalidate_tier(&self) {
        if self.cell.discard() {
            debug!("Cached KYC tier invalidated");
        }
    }

    /// Cached tier, if any, without touching the backend.
    pub fn cached_tier(&self) -> Option<ResolvedTier> {
        self.cell.peek().map(|cached| cached.resolved)
    }

    pub fn status(&self) -> CellStatus {
        self.cell.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::test_support::{credentials, t0, FakeTierService, FakeTokenProvider};
    use crate::tier::Tier;
    use tokio::task::JoinSet;

    struct Fixture {
        clock: Arc<ManualClock>,
        provider: Arc<FakeTokenProvider>,
        service: Arc<FakeTierService>,
        resolver: TierResolver,
    }

    fn fixture(tier: Tier) -> Fixture {
        let clock = Arc::new(ManualClock::new(t0()));
        let provider = Arc::new(FakeTokenProvider::new(Arc::clone(&clock)));
        let service = Arc::new(FakeTierService::new(tier));
        let session = SessionTokenCache::new(provider.clone(), credentials())
            .with_clock(clock.clone());
        let resolver = TierResolver::new(session, service.clone()).with_clock(clock.clone());
        Fixture {
            clock,
            provider,
            service,
            resolver,
        }
    }

    #[tokio::test]
    async fn resolves_and_caches_tier() {
        let fx = fixture(Tier::Tier1);

        assert_eq!(fx.resolver.current_tier().await.unwrap().tier, Tier::Tier1);
        assert_eq!(fx.resolver.current_tier().await.unwrap().tier, Tier::Tier1);

        assert_eq!(fx.service.calls(), 1);
        assert_eq!(fx.provider.calls(), 1);
        assert_eq!(fx.resolver.cached_tier().unwrap().tier, Tier::Tier1);
    }

    #[tokio::test]
    async fn ttl_expiry_refetches() {
        let fx = fixture(Tier::Tier1);
        fx.resolver.current_tier().await.unwrap();

        fx.clock
            .advance(Duration::seconds(DEFAULT_TIER_CACHE_TTL_SECS - 1));
        fx.resolver.current_tier().await.unwrap();
        assert_eq!(fx.service.calls(), 1);

        fx.clock.advance(Duration::seconds(1));
        fx.resolver.current_tier().await.unwrap();
        assert_eq!(fx.service.calls(), 2);
    }

    #[tokio::test]
    async fn invalidate_tier_picks_up_upgrade() {
        let fx = fixture(Tier::Tier1);
        assert_eq!(fx.resolver.current_tier().await.unwrap().tier, Tier::Tier1);

        fx.service.set_tier(Tier::Tier2);
        assert_eq!(fx.resolver.current_tier().await.unwrap().tier, Tier::Tier1);

        fx.resolver.invalidate_tier();
        assert_eq!(fx.resolver.current_tier().await.unwrap().tier, Tier::Tier2);
        assert_eq!(fx.service.calls(), 2);
        // Session token is still valid and reused
        assert_eq!(fx.provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_lookups_share_one_fetch() {
        let fx = fixture(Tier::Tier2);
        fx.service.set_delay(std::time::Duration::from_millis(50));

        let mut set = JoinSet::new();
        for _ in 0..16 {
            let resolver = fx.resolver.clone();
            set.spawn(async move { resolver.current_tier().await });
        }
        while let Some(result) = set.join_next().await {
            assert_eq!(result.unwrap().unwrap().tier, Tier::Tier2);
        }

        assert_eq!(fx.service.calls(), 1);
        assert_eq!(fx.provider.calls(), 1);
    }

    #[tokio::test]
    async fn token_failure_propagates_and_leaves_cache_empty() {
        let fx = fixture(Tier::Tier2);
        fx.provider.fail_with(Some(AuthError::Unauthorized));

        assert_eq!(fx.resolver.current_tier().await, Err(AuthError::Unauthorized));
        assert_eq!(fx.service.calls(), 0);
        assert_eq!(fx.resolver.status(), CellStatus::Empty);

        fx.provider.fail_with(None);
        assert_eq!(fx.resolver.current_tier().await.unwrap().tier, Tier::Tier2);
    }

    #[tokio::test]
    async fn service_failure_propagates() {
        let fx = fixture(Tier::Tier2);
        fx.service
            .fail_with(Some(AuthError::ServerError("HTTP 502".into())));

        assert_eq!(
            fx.resolver.current_tier().await,
            Err(AuthError::ServerError("HTTP 502".into()))
        );
        assert!(fx.resolver.cached_tier().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_during_lookup_refetches_on_next_call() {
        let fx = fixture(Tier::Tier1);
        fx.service.set_delay(std::time::Duration::from_millis(50));

        let in_flight = {
            let resolver = fx.resolver.clone();
            tokio::spawn(async move { resolver.current_tier().await })
        };
        while fx.service.calls() == 0 {
            tokio::task::yield_now().await;
        }

        // Verification completes while the old lookup is still running.
        fx.service.set_tier(Tier::Tier2);
        fx.resolver.invalidate_tier();

        assert_eq!(in_flight.await.unwrap().unwrap().tier, Tier::Tier1);
        assert_eq!(fx.resolver.current_tier().await.unwrap().tier, Tier::Tier2);
        assert_eq!(fx.service.calls(), 2);
        assert_eq!(fx.resolver.cached_tier().unwrap().tier, Tier::Tier2);
    }

    #[tokio::test]
    async fn rejected_token_is_dropped_from_session_cache() {
        let fx = fixture(Tier::Tier1);
        fx.service.reject_next(1);

        assert_eq!(fx.resolver.current_tier().await, Err(AuthError::Unauthorized));
        assert!(!fx.resolver.session().is_cached());

        assert_eq!(fx.resolver.current_tier().await.unwrap().tier, Tier::Tier1);
        assert_eq!(fx.provider.calls(), 2);
    }
}
