// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access gate: decides whether a capability may be used.
//!
//! ## Resolution Order
//!
//! 1. Internal override for the feature, if set
//! 2. Required tier, if declared (lookup failure denies)
//! 3. Remote rollout flag, if declared (unavailable source falls back to
//!    the compiled default, or denies for security-sensitive gates)
//! 4. Compiled default
//!
//! The first step that produces an answer wins. Errors never escape; every
//! check ends in allowed or denied.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::capability::Capability;
use crate::flags::{GatedFeature, InternalFeatureFlagRegistry, RolloutFlagSource};
use crate::session::AuthError;
use crate::tier::{ResolvedTier, TierResolver};

/// Which step produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    Override,
    Tier,
    Rollout,
    Default,
}

/// Outcome of an access check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AccessDecision {
    pub feature: GatedFeature,
    pub allowed: bool,
    pub source: DecisionSource,
}

impl AccessDecision {
    fn new(feature: GatedFeature, allowed: bool, source: DecisionSource) -> Self {
        Self {
            feature,
            allowed,
            source,
        }
    }
}

/// Composition root for capability checks.
pub struct AccessGate {
    flags: Arc<InternalFeatureFlagRegistry>,
    tiers: TierResolver,
    rollout: Arc<dyn RolloutFlagSource>,
}

impl AccessGate {
    pub fn new(
        flags: Arc<InternalFeatureFlagRegistry>,
        tiers: TierResolver,
        rollout: Arc<dyn RolloutFlagSource>,
    ) -> Self {
        Self {
            flags,
            tiers,
            rollout,
        }
    }

    pub fn flags(&self) -> &InternalFeatureFlagRegistry {
        &self.flags
    }

    pub fn tiers(&self) -> &TierResolver {
        &self.tiers
    }

    /// Check if the capability may be used.
    pub async fn is_permitted(&self, capability: &Capability) -> bool {
        self.evaluate(capability).await.allowed
    }

    /// Check a feature against its static capability declaration.
    pub async fn is_feature_permitted(&self, feature: GatedFeature) -> bool {
        self.is_permitted(&Capability::for_feature(feature)).await
    }

    /// Resolve a capability and report which step decided it.
    pub async fn evaluate(&self, capability: &Capability) -> AccessDecision {
        let feature = capability.feature;

        if let Some(forced) = self.flags.override_for(feature) {
            debug!(feature = %feature, allowed = forced, "Access decided by internal override");
            return AccessDecision::new(feature, forced, DecisionSource::Override);
        }

        if let Some(required) = capability.required_tier {
            match self.resolve_tier().await {
                Ok(resolved) if resolved.tier.satisfies(required) => {
                    if capability.rollout.is_none() {
                        return AccessDecision::new(feature, true, DecisionSource::Tier);
                    }
                }
                Ok(resolved) => {
                    debug!(
                        feature = %feature,
                        tier = %resolved.tier,
                        required = %required,
                        "Access denied by tier"
                    );
                    return AccessDecision::new(feature, false, DecisionSource::Tier);
                }
                Err(e) => {
                    warn!(
                        feature = %feature,
                        error = %e,
                        error_code = e.error_code(),
                        "Tier lookup failed, denying access"
                    );
                    return AccessDecision::new(feature, false, DecisionSource::Tier);
                }
            }
        }

        if let Some(gate) = &capability.rollout {
            return match self.rollout.is_enabled(&gate.key).await {
                Ok(enabled) => AccessDecision::new(feature, enabled, DecisionSource::Rollout),
                Err(e) => {
                    let fallback = !gate.security_sensitive && self.flags.default_state(feature);
                    warn!(
                        feature = %feature,
                        rollout_key = %gate.key,
                        security_sensitive = gate.security_sensitive,
                        allowed = fallback,
                        error = %e,
                        "Rollout flag unavailable, using fallback"
                    );
                    AccessDecision::new(feature, fallback, DecisionSource::Default)
                }
            };
        }

        AccessDecision::new(
            feature,
            self.flags.default_state(feature),
            DecisionSource::Default,
        )
    }

    /// Tier lookup with one retry on a rejected session token.
    ///
    /// The resolver has already dropped the rejected token, so the retry
    /// runs with a fresh one; a token another caller fetched meanwhile is
    /// reused rather than discarded.
    async fn resolve_tier(&self) -> Result<ResolvedTier, AuthError> {
        match self.tiers.current_tier().await {
            Err(AuthError::Unauthorized) => {
                debug!("Tier lookup unauthorized, retrying with a new session token");
                self.tiers.current_tier().await
            }
            other => other,
        }
    }
}
