// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! KYC verification tiers.
//!
//! `TierResolver` turns the backend tier list into one effective [`Tier`]
//! and caches it, authenticating through the session token cache.

pub mod model;
pub mod resolver;
pub mod service;

pub use model::{KycTierState, KycTiers, ResolvedTier, Tier, TierLimits, TierResponse};
pub use resolver::TierResolver;
pub use service::TierService;
