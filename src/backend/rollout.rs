// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Remote rollout flags fetched over HTTP.
//!
//! - The flag document is a flat JSON object of `key -> bool`
//! - The last document is cached with a configurable TTL
//! - Callers arriving after the TTL share one fetch
//! - A stale document is served when a refresh fails (rollout flags are
//!   eventually consistent anyway)

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::config::ConfigError;
use crate::flags::{RolloutError, RolloutFlagSource};
use crate::single_flight::SingleFlightCell;

/// Default rollout cache TTL (1 minute).
pub const DEFAULT_ROLLOUT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Rollout cache entry.
#[derive(Clone)]
struct CacheEntry {
    flags: Arc<HashMap<String, bool>>,
    fetched_at: Instant,
}

/// Rollout flag source with caching.
#[derive(Clone)]
pub struct HttpRolloutFlags {
    /// Flag document URL
    url: Url,
    /// Cache TTL
    cache_ttl: Duration,
    /// Cached flag document
    cell: SingleFlightCell<CacheEntry, RolloutError>,
    /// HTTP client
    client: reqwest::Client,
}

impl HttpRolloutFlags {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            url,
            cache_ttl: DEFAULT_ROLLOUT_CACHE_TTL,
            cell: SingleFlightCell::new(),
            client,
        })
    }

    /// Create with custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Fetch the flag document (with caching).
    async fn get_flags(&self) -> Result<Arc<HashMap<String, bool>>, RolloutError> {
        let ttl = self.cache_ttl;
        let previous = self.cell.peek();
        let client = self.client.clone();
        let url = self.url.clone();

        let entry = self
            .cell
            .get_or_refresh(
                |entry| entry.fetched_at.elapsed() < ttl,
                move || async move {
                    match fetch_flags(&client, url).await {
                        Ok(flags) => {
                            debug!(count = flags.len(), "Rollout flags refreshed");
                            Ok(CacheEntry {
                                flags: Arc::new(flags),
                                fetched_at: Instant::now(),
                            })
                        }
                        Err(e) => match previous {
                            Some(stale) => {
                                warn!(error = %e, "Rollout flag refresh failed, serving stale flags");
                                Ok(stale)
                            }
                            None => Err(e),
                        },
                    }
                },
            )
            .await?;

        Ok(entry.flags)
    }
}

/// Fetch the flag document from the endpoint.
async fn fetch_flags(
    client: &reqwest::Client,
    url: Url,
) -> Result<HashMap<String, bool>, RolloutError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| RolloutError::Unavailable(e.to_string()))?;

    if !response.status().is_success() {
        return Err(RolloutError::Unavailable(format!(
            "HTTP {} from rollout endpoint",
            response.status()
        )));
    }

    response
        .json()
        .await
        .map_err(|e| RolloutError::Unavailable(e.to_string()))
}

#[async_trait]
impl RolloutFlagSource for HttpRolloutFlags {
    async fn is_enabled(&self, key: &str) -> Result<bool, RolloutError> {
        let flags = self.get_flags().await?;
        flags
            .get(key)
            .copied()
            .ok_or_else(|| RolloutError::UnknownFlag(key.to_string()))
    }
}
