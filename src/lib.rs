// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Session Gate - Session Token and Capability Gating
//!
//! This crate keeps a wallet's backend session token fresh, resolves the
//! user's KYC tier, and decides whether gated features may be used.
//!
//! ## Modules
//!
//! - `session` - Session token cache with single-flight refresh
//! - `tier` - KYC tier model and cached resolver
//! - `flags` - Gated features, internal overrides, rollout flags
//! - `access` - Capability declarations and the access gate
//! - `backend` - reqwest adapters for the wallet backend
//! - `api` - Diagnostics HTTP handlers (Axum)

pub mod access;
pub mod api;
pub mod backend;
pub mod clock;
pub mod config;
pub mod error;
pub mod flags;
pub mod session;
pub mod single_flight;
pub mod state;
pub mod tier;

#[cfg(test)]
pub(crate) mod test_support;
