// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::access::AccessGate;
use crate::flags::InternalFeatureFlagRegistry;
use crate::session::SessionTokenCache;
use crate::tier::TierResolver;

#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AccessGate>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(gate: AccessGate) -> Self {
        Self {
            gate: Arc::new(gate),
            started_at: Utc::now(),
        }
    }

    pub fn flags(&self) -> &InternalFeatureFlagRegistry {
        self.gate.flags()
    }

    pub fn tiers(&self) -> &TierResolver {
        self.gate.tiers()
    }

    pub fn session(&self) -> &SessionTokenCache {
        self.gate.tiers().session()
    }
}
