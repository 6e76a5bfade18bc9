// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gated features and build kinds.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Build configuration the process runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BuildKind {
    /// Company-internal build (dogfood, QA)
    Internal,
    /// Public release build
    #[default]
    Release,
}

impl BuildKind {
    pub fn is_internal(self) -> bool {
        self == BuildKind::Internal
    }

    /// Parse build kind from string (case-insensitive).
    pub fn parse(s: &str) -> Option<BuildKind> {
        match s.trim().to_lowercase().as_str() {
            "internal" => Some(BuildKind::Internal),
            "release" => Some(BuildKind::Release),
            _ => None,
        }
    }
}

/// Feature identifiers that can be gated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatedFeature {
    Checkout,
    SingleSignOn,
    ModernAuthPairing,
    RecurringBuys,
}

impl GatedFeature {
    pub const ALL: [GatedFeature; 4] = [
        GatedFeature::Checkout,
        GatedFeature::SingleSignOn,
        GatedFeature::ModernAuthPairing,
        GatedFeature::RecurringBuys,
    ];

    /// Stable identifier, as used on the diagnostics surface.
    pub fn key(self) -> &'static str {
        match self {
            GatedFeature::Checkout => "CHECKOUT",
            GatedFeature::SingleSignOn => "SINGLE_SIGN_ON",
            GatedFeature::ModernAuthPairing => "MODERN_AUTH_PAIRING",
            GatedFeature::RecurringBuys => "RECURRING_BUYS",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GatedFeature::Checkout => "New checkout screen",
            GatedFeature::SingleSignOn => "Single sign-on login",
            GatedFeature::ModernAuthPairing => "Modern auth pairing",
            GatedFeature::RecurringBuys => "Recurring buys",
        }
    }

    /// Whether the feature is on by default in company-internal builds.
    pub fn enabled_for_company_internal_build(self) -> bool {
        match self {
            GatedFeature::Checkout => true,
            GatedFeature::SingleSignOn => true,
            GatedFeature::ModernAuthPairing => false,
            GatedFeature::RecurringBuys => true,
        }
    }

    /// Compiled-in default for the given build. Release builds default off.
    pub fn default_state(self, build: BuildKind) -> bool {
        build.is_internal() && self.enabled_for_company_internal_build()
    }

    /// Parse a feature key (case-insensitive).
    pub fn parse(s: &str) -> Option<GatedFeature> {
        let upper = s.trim().to_uppercase();
        GatedFeature::ALL.into_iter().find(|f| f.key() == upper)
    }
}

impl fmt::Display for GatedFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
