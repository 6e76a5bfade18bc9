// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Feature flags: compiled catalog, internal overrides and remote rollout.

pub mod feature;
pub mod registry;
pub mod rollout;

pub use feature::{BuildKind, GatedFeature};
pub use registry::{FlagStatus, InternalFeatureFlagRegistry};
pub use rollout::{RolloutError, RolloutFlagSource, StaticRolloutFlags};
