// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Capability declarations.

use crate::flags::GatedFeature;
use crate::tier::Tier;

/// Remote rollout gate attached to a capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloutGate {
    /// Key in the remote rollout configuration
    pub key: String,
    /// Deny instead of falling back to the compiled default when the
    /// rollout source cannot answer
    pub security_sensitive: bool,
}

/// A request to use a gated feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    pub feature: GatedFeature,
    pub required_tier: Option<Tier>,
    pub rollout: Option<RolloutGate>,
}

impl Capability {
    /// Capability with no tier or rollout gate.
    pub fn new(feature: GatedFeature) -> Self {
        Self {
            feature,
            required_tier: None,
            rollout: None,
        }
    }

    pub fn requires_tier(mut self, tier: Tier) -> Self {
        self.required_tier = Some(tier);
        self
    }

    pub fn gated_by_rollout(mut self, key: impl Into<String>, security_sensitive: bool) -> Self {
        self.rollout = Some(RolloutGate {
            key: key.into(),
            security_sensitive,
        });
        self
    }

    /// Static declaration of each gated feature.
    pub fn for_feature(feature: GatedFeature) -> Self {
        let capability = Capability::new(feature);
        match feature {
            GatedFeature::Checkout => capability.gated_by_rollout("ff_checkout", false),
            GatedFeature::SingleSignOn => capability.gated_by_rollout("ff_sso_login", true),
            GatedFeature::ModernAuthPairing => {
                capability.gated_by_rollout("ff_modern_auth_pairing", true)
            }
            GatedFeature::RecurringBuys => capability
                .requires_tier(Tier::Tier2)
                .gated_by_rollout("ff_recurring_buys", false),
        }
    }
}

impl From<GatedFeature> for Capability {
    fn from(feature: GatedFeature) -> Self {
        Capability::for_feature(feature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recurring_buys_needs_tier2() {
        let capability = Capability::for_feature(GatedFeature::RecurringBuys);
        assert_eq!(capability.required_tier, Some(Tier::Tier2));
        assert_eq!(capability.rollout.unwrap().key, "ff_recurring_buys");
    }

    #[test]
    fn auth_features_are_security_sensitive() {
        for feature in [GatedFeature::SingleSignOn, GatedFeature::ModernAuthPairing] {
            let capability = Capability::from(feature);
            assert!(capability.rollout.unwrap().security_sensitive);
            assert_eq!(capability.required_tier, None);
        }
    }

    #[test]
    fn builder_sets_gates() {
        let capability = Capability::new(GatedFeature::Checkout)
            .requires_tier(Tier::Tier1)
            .gated_by_rollout("ff_x", true);
        assert_eq!(capability.required_tier, Some(Tier::Tier1));
        assert_eq!(
            capability.rollout,
            Some(RolloutGate {
                key: "ff_x".to_string(),
                security_sensitive: true
            })
        );
    }
}
