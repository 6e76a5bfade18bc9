// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Internal feature flag overrides.
//!
//! Debug tooling can force any [`GatedFeature`] on or off. An override wins
//! over every other source of truth; clearing it falls back to the
//! feature's compiled default for the running build.
//!
//! One registry is created at process start and shared by reference.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use super::feature::{BuildKind, GatedFeature};

/// Diagnostic view of one flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FlagStatus {
    pub feature: GatedFeature,
    pub label: String,
    /// Resolved state (override, else default)
    pub enabled: bool,
    /// Compiled default for the running build
    pub default_state: bool,
    /// Forced state, if overridden
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overridden: Option<bool>,
}

/// Override table for gated features.
#[derive(Debug, Default)]
pub struct InternalFeatureFlagRegistry {
    build: BuildKind,
    overrides: RwLock<HashMap<GatedFeature, bool>>,
}

impl InternalFeatureFlagRegistry {
    /// Create an empty registry (no overrides) for the given build.
    pub fn new(build: BuildKind) -> Self {
        Self {
            build,
            overrides: RwLock::new(HashMap::new()),
        }
    }

    pub fn build(&self) -> BuildKind {
        self.build
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<GatedFeature, bool>> {
        self.overrides.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<GatedFeature, bool>> {
        self.overrides.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Forced state of a feature, if any.
    pub fn override_for(&self, feature: GatedFeature) -> Option<bool> {
        self.read().get(&feature).copied()
    }

    /// Compiled default of a feature for the running build.
    pub fn default_state(&self, feature: GatedFeature) -> bool {
        feature.default_state(self.build)
    }

    pub fn is_enabled(&self, feature: GatedFeature) -> bool {
        self.override_for(feature)
            .unwrap_or_else(|| self.default_state(feature))
    }

    pub fn enable(&self, feature: GatedFeature) {
        self.set(feature, true);
    }

    pub fn disable(&self, feature: GatedFeature) {
        self.set(feature, false);
    }

    fn set(&self, feature: GatedFeature, enabled: bool) {
        self.write().insert(feature, enabled);
        info!(feature = %feature, enabled, "Internal feature flag overridden");
    }

    /// Clear every override.
    pub fn disable_all(&self) {
        let cleared = {
            let mut overrides = self.write();
            let count = overrides.len();
            overrides.clear();
            count
        };
        info!(cleared, "Internal feature flag overrides cleared");
    }

    /// Resolved state of every feature.
    pub fn get_all(&self) -> BTreeMap<GatedFeature, bool> {
        let overrides = self.read();
        GatedFeature::ALL
            .into_iter()
            .map(|feature| {
                let enabled = overrides
                    .get(&feature)
                    .copied()
                    .unwrap_or_else(|| self.default_state(feature));
                (feature, enabled)
            })
            .collect()
    }

    /// Per-flag diagnostics, in catalog order.
    pub fn statuses(&self) -> Vec<FlagStatus> {
        let overrides = self.read();
        GatedFeature::ALL
            .into_iter()
            .map(|feature| {
                let overridden = overrides.get(&feature).copied();
                let default_state = self.default_state(feature);
                FlagStatus {
                    feature,
                    label: feature.label().to_string(),
                    enabled: overridden.unwrap_or(default_state),
                    default_state,
                    overridden,
                }
            })
            .collect()
    }
}
