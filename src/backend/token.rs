// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token exchange over HTTP.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;

use super::{read_json, transport_error, BackendClient};
use crate::session::token::CLIENT_TYPE;
use crate::session::{AuthError, SessionToken, TokenProvider, WalletCredentials};

const SESSION_TOKEN_PATH: &str = "auth";

#[async_trait]
impl TokenProvider for BackendClient {
    async fn fetch(&self, credentials: &WalletCredentials) -> Result<SessionToken, AuthError> {
        let mut url = self.endpoint(SESSION_TOKEN_PATH)?;
        url.query_pairs_mut()
            .append_pair("userId", &credentials.user_id);

        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", credentials.lifetime_token))
            .header("X-WALLET-GUID", &credentials.guid)
            .header("X-WALLET-EMAIL", &credentials.email)
            .header("X-APP-VERSION", &credentials.app_version)
            .header("X-CLIENT-TYPE", CLIENT_TYPE)
            .header("X-DEVICE-ID", &credentials.device_id)
            .send()
            .await
            .map_err(transport_error)?;

        read_json(response, "session token").await
    }
}
