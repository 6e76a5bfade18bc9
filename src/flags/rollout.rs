// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Remote rollout flag source contract.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

/// Rollout lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RolloutError {
    #[error("Rollout flags unavailable: {0}")]
    Unavailable(String),

    #[error("Rollout flag not published: {0}")]
    UnknownFlag(String),
}

/// Remote rollout configuration, treated as eventually consistent.
#[async_trait]
pub trait RolloutFlagSource: Send + Sync {
    async fn is_enabled(&self, key: &str) -> Result<bool, RolloutError>;
}

/// In-memory rollout source for development builds and tests.
///
/// `None` models a source that cannot be reached.
#[derive(Debug, Default)]
pub struct StaticRolloutFlags {
    flags: RwLock<Option<HashMap<String, bool>>>,
}

impl StaticRolloutFlags {
    pub fn new(flags: HashMap<String, bool>) -> Self {
        Self {
            flags: RwLock::new(Some(flags)),
        }
    }

    /// A source that always reports itself unavailable.
    pub fn unavailable() -> Self {
        Self {
            flags: RwLock::new(None),
        }
    }

    pub fn set(&self, key: impl Into<String>, enabled: bool) {
        let mut flags = self.flags.write().unwrap_or_else(PoisonError::into_inner);
        flags.get_or_insert_with(HashMap::new).insert(key.into(), enabled);
    }

    pub fn set_unavailable(&self) {
        *self.flags.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[async_trait]
impl RolloutFlagSource for StaticRolloutFlags {
    async fn is_enabled(&self, key: &str) -> Result<bool, RolloutError> {
        let flags = self.flags.read().unwrap_or_else(PoisonError::into_inner);
        let flags = flags
            .as_ref()
            .ok_or_else(|| RolloutError::Unavailable("static source offline".to_string()))?;
        flags
            .get(key)
            .copied()
            .ok_or_else(|| RolloutError::UnknownFlag(key.to_string()))
    }
}
