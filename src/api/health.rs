// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::flags::BuildKind;
use crate::single_flight::CellStatus;
use crate::state::AppState;

/// Health report with the state of each cache.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthReport {
    /// Always "ok" while the process serves requests.
    pub status: String,
    pub build: BuildKind,
    pub uptime_seconds: i64,
    pub checks: HealthChecks,
}

/// Cache states. Nothing here triggers a backend call.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    pub session_token: CellStatus,
    pub kyc_tier: CellStatus,
}

/// Simple health check response for liveness checks.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Health check endpoint handler.
///
/// Reports cache state only; an empty cache is not a failure since the
/// next access check fills it.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthReport)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok".to_string(),
        build: state.flags().build(),
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
        checks: HealthChecks {
            session_token: state.session().status(),
            kyc_tier: state.tiers().status(),
        },
    })
}

/// Liveness handler.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
