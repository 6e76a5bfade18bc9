// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    Json,
};

use super::flags::parse_feature;
use crate::{access::AccessDecision, error::ApiError, state::AppState};

/// Evaluate a feature against its capability declaration.
///
/// May refresh the session token and KYC tier.
#[utoipa::path(
    get,
    path = "/v1/access/{flag}",
    params(
        ("flag" = String, Path, description = "Gated feature key, e.g. RECURRING_BUYS")
    ),
    tag = "Access",
    responses(
        (status = 200, body = AccessDecision),
        (status = 404, description = "Unknown feature")
    )
)]
pub async fn check_access(
    State(state): State<AppState>,
    Path(flag): Path<String>,
) -> Result<Json<AccessDecision>, ApiError> {
    let feature = parse_feature(&flag)?;
    Ok(Json(state.gate.evaluate(&feature.into()).await))
}
