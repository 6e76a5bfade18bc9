// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! KYC tier model.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Verification tier.
///
/// ## Tier Ordering
///
/// - `Unverified` - email-only wallet, no custodial features
/// - `Tier1` - basic identity checks, low limits
/// - `Tier2` - full document verification
///
/// Comparison is ordinal: a user at `Tier2` satisfies a `Tier1` requirement.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Unverified,
    Tier1,
    Tier2,
}

impl Tier {
    /// Highest tier the backend issues.
    pub const MAX: Tier = Tier::Tier2;

    /// Map a backend tier index. Indices above the highest known tier clamp to it.
    pub fn from_level(level: u8) -> Tier {
        match level {
            0 => Tier::Unverified,
            1 => Tier::Tier1,
            _ => Tier::Tier2,
        }
    }

    pub fn level(self) -> u8 {
        match self {
            Tier::Unverified => 0,
            Tier::Tier1 => 1,
            Tier::Tier2 => 2,
        }
    }

    /// Check if this tier satisfies the required tier.
    pub fn satisfies(self, required: Tier) -> bool {
        self >= required
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Unverified => write!(f, "unverified"),
            Tier::Tier1 => write!(f, "tier1"),
            Tier::Tier2 => write!(f, "tier2"),
        }
    }
}

/// Verification state of a single tier, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycTierState {
    None,
    Pending,
    UnderReview,
    Rejected,
    Verified,
    Expired,
    /// Any state string this client does not know
    #[serde(other)]
    Unknown,
}

impl KycTierState {
    /// Submitted and awaiting a decision.
    pub fn is_in_progress(self) -> bool {
        matches!(self, KycTierState::Pending | KycTierState::UnderReview)
    }
}

/// Transaction ceilings attached to a tier, in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierLimits {
    pub currency: String,
    /// `None` means no daily ceiling
    #[serde(default)]
    pub daily: Option<u64>,
    /// `None` means no annual ceiling
    #[serde(default)]
    pub annual: Option<u64>,
}

/// One entry of the backend tier list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierResponse {
    pub index: u8,
    #[serde(default)]
    pub name: String,
    pub state: KycTierState,
    #[serde(default)]
    pub limits: Option<TierLimits>,
}

/// Backend tier list for the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KycTiers {
    pub tiers: Vec<TierResponse>,
}

impl KycTiers {
    /// Collapse the tier list into the user's effective tier.
    ///
    /// The effective tier is the highest index in `Verified` state. The
    /// pending tier, if any, is the highest tier above it still in progress.
    pub fn resolve(&self) -> ResolvedTier {
        let verified = self
            .tiers
            .iter()
            .filter(|t| t.state == KycTierState::Verified)
            .max_by_key(|t| t.index);

        let tier = verified
            .map(|t| Tier::from_level(t.index))
            .unwrap_or(Tier::Unverified);

        let pending = self
            .tiers
            .iter()
            .filter(|t| t.state.is_in_progress())
            .map(|t| Tier::from_level(t.index))
            .filter(|t| *t > tier)
            .max();

        ResolvedTier {
            tier,
            limits: verified.and_then(|t| t.limits.clone()),
            pending,
        }
    }
}

/// Effective verification tier of the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ResolvedTier {
    pub tier: Tier,
    /// Limits of the effective tier, if the backend reported any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<TierLimits>,
    /// Higher tier currently under review
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<Tier>,
}
