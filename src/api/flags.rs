// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Internal feature flag overrides for debug tooling.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::ApiError,
    flags::{FlagStatus, GatedFeature},
    state::AppState,
};

pub(crate) fn parse_feature(name: &str) -> Result<GatedFeature, ApiError> {
    GatedFeature::parse(name).ok_or_else(|| ApiError::unknown_feature(name))
}

#[utoipa::path(
    get,
    path = "/v1/feature-flags",
    tag = "Feature Flags",
    responses((status = 200, body = [FlagStatus]))
)]
pub async fn list_flags(State(state): State<AppState>) -> Json<Vec<FlagStatus>> {
    Json(state.flags().statuses())
}

#[utoipa::path(
    post,
    path = "/v1/feature-flags/{flag}/enable",
    params(
        ("flag" = String, Path, description = "Gated feature key, e.g. RECURRING_BUYS")
    ),
    tag = "Feature Flags",
    responses(
        (status = 200, body = [FlagStatus]),
        (status = 404, description = "Unknown feature")
    )
)]
pub async fn enable_flag(
    State(state): State<AppState>,
    Path(flag): Path<String>,
) -> Result<Json<Vec<FlagStatus>>, ApiError> {
    state.flags().enable(parse_feature(&flag)?);
    Ok(Json(state.flags().statuses()))
}

#[utoipa::path(
    post,
    path = "/v1/feature-flags/{flag}/disable",
    params(
        ("flag" = String, Path, description = "Gated feature key, e.g. RECURRING_BUYS")
    ),
    tag = "Feature Flags",
    responses(
        (status = 200, body = [FlagStatus]),
        (status = 404, description = "Unknown feature")
    )
)]
pub async fn disable_flag(
    State(state): State<AppState>,
    Path(flag): Path<String>,
) -> Result<Json<Vec<FlagStatus>>, ApiError> {
    state.flags().disable(parse_feature(&flag)?);
    Ok(Json(state.flags().statuses()))
}

/// Clear every override, returning each feature to its build default.
#[utoipa::path(
    delete,
    path = "/v1/feature-flags",
    tag = "Feature Flags",
    responses((status = 200, body = [FlagStatus]))
)]
pub async fn disable_all_flags(State(state): State<AppState>) -> Json<Vec<FlagStatus>> {
    state.flags().disable_all();
    Json(state.flags().statuses())
}
