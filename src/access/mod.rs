// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Capability access checks.

pub mod capability;
pub mod gate;

pub use capability::{Capability, RolloutGate};
pub use gate::{AccessDecision, AccessGate, DecisionSource};
