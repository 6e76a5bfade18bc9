// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! KYC tier lookup over HTTP.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;

use super::{read_json, transport_error, BackendClient};
use crate::session::{AuthError, SessionToken};
use crate::tier::{KycTiers, TierService};

const KYC_TIERS_PATH: &str = "kyc/tiers";

#[async_trait]
impl TierService for BackendClient {
    async fn fetch_tiers(&self, token: &SessionToken) -> Result<KycTiers, AuthError> {
        let response = self
            .http
            .get(self.endpoint(KYC_TIERS_PATH)?)
            .header(AUTHORIZATION, token.auth_header())
            .send()
            .await
            .map_err(transport_error)?;

        read_json(response, "KYC tiers").await
    }
}
