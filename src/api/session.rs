// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};

use crate::{error::ApiError, state::AppState, tier::ResolvedTier};

#[utoipa::path(
    get,
    path = "/v1/session/tier",
    tag = "Session",
    responses(
        (status = 200, body = ResolvedTier),
        (status = 401, description = "Backend rejected the wallet credentials"),
        (status = 502, description = "Backend error"),
        (status = 503, description = "Backend unreachable")
    )
)]
pub async fn current_tier(State(state): State<AppState>) -> Result<Json<ResolvedTier>, ApiError> {
    Ok(Json(state.tiers().current_tier().await?))
}

/// Drop the cached tier so the next lookup hits the backend.
#[utoipa::path(
    post,
    path = "/v1/session/tier/invalidate",
    tag = "Session",
    responses((status = 204, description = "Cached tier dropped"))
)]
pub async fn invalidate_tier(State(state): State<AppState>) -> StatusCode {
    state.tiers().invalidate_tier();
    StatusCode::NO_CONTENT
}
