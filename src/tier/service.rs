// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Remote tier lookup contract.

use async_trait::async_trait;

use super::model::KycTiers;
use crate::session::{AuthError, SessionToken};

/// Fetches the current user's tier list from the backend.
#[async_trait]
pub trait TierService: Send + Sync {
    async fn fetch_tiers(&self, token: &SessionToken) -> Result<KycTiers, AuthError>;
}
