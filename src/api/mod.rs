// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    access::{AccessDecision, DecisionSource},
    flags::{BuildKind, FlagStatus, GatedFeature},
    single_flight::CellStatus,
    state::AppState,
    tier::{ResolvedTier, Tier, TierLimits},
};

pub mod access;
pub mod flags;
pub mod health;
pub mod session;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route(
            "/feature-flags",
            get(flags::list_flags).delete(flags::disable_all_flags),
        )
        .route("/feature-flags/{flag}/enable", post(flags::enable_flag))
        .route("/feature-flags/{flag}/disable", post(flags::disable_flag))
        .route("/access/{flag}", get(access::check_access))
        .route("/session/tier", get(session::current_tier))
        .route(
            "/session/tier/invalidate",
            post(session::invalidate_tier),
        )
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state)
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        flags::list_flags,
        flags::enable_flag,
        flags::disable_flag,
        flags::disable_all_flags,
        access::check_access,
        session::current_tier,
        session::invalidate_tier
    ),
    components(
        schemas(
            health::HealthReport,
            health::HealthChecks,
            health::HealthResponse,
            AccessDecision,
            DecisionSource,
            BuildKind,
            CellStatus,
            FlagStatus,
            GatedFeature,
            ResolvedTier,
            Tier,
            TierLimits
        )
    ),
    tags(
        (name = "Health", description = "Liveness and cache state"),
        (name = "Feature Flags", description = "Internal feature flag overrides"),
        (name = "Access", description = "Capability checks"),
        (name = "Session", description = "Session and KYC tier")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::access::AccessGate;
    use crate::clock::ManualClock;
    use crate::flags::{InternalFeatureFlagRegistry, StaticRolloutFlags};
    use crate::session::{AuthError, SessionTokenCache};
    use crate::test_support::{credentials, t0, FakeTierService, FakeTokenProvider};
    use crate::tier::TierResolver;

    struct Fixture {
        provider: Arc<FakeTokenProvider>,
        service: Arc<FakeTierService>,
        state: AppState,
    }

    fn fixture(build: BuildKind, tier: Tier) -> Fixture {
        let clock = Arc::new(ManualClock::new(t0()));
        let provider = Arc::new(FakeTokenProvider::new(Arc::clone(&clock)));
        let service = Arc::new(FakeTierService::new(tier));
        let rollout = Arc::new(StaticRolloutFlags::new(HashMap::from([(
            "ff_recurring_buys".to_string(),
            true,
        )])));
        let session =
            SessionTokenCache::new(provider.clone(), credentials()).with_clock(clock.clone());
        let tiers = TierResolver::new(session, service.clone()).with_clock(clock);
        let flags = Arc::new(InternalFeatureFlagRegistry::new(build));
        Fixture {
            provider,
            service,
            state: AppState::new(AccessGate::new(flags, tiers, rollout)),
        }
    }

    async fn send(state: &AppState, method: Method, uri: &str) -> (StatusCode, Value) {
        let response = router(state.clone())
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn flag<'a>(statuses: &'a Value, key: &str) -> &'a Value {
        statuses
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["feature"] == key)
            .unwrap()
    }

    #[tokio::test]
    async fn liveness_is_ok() {
        let fx = fixture(BuildKind::Release, Tier::Unverified);
        let (status, body) = send(&fx.state, Method::GET, "/health/live").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn health_reports_cache_state_without_fetching() {
        let fx = fixture(BuildKind::Internal, Tier::Tier1);
        let (status, body) = send(&fx.state, Method::GET, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["build"], "internal");
        assert_eq!(body["checks"]["session_token"], "empty");
        assert_eq!(body["checks"]["kyc_tier"], "empty");
        assert_eq!(fx.provider.calls(), 0);

        send(&fx.state, Method::GET, "/v1/session/tier").await;
        let (_, body) = send(&fx.state, Method::GET, "/health").await;
        assert_eq!(body["checks"]["session_token"], "valid");
        assert_eq!(body["checks"]["kyc_tier"], "valid");
    }

    #[tokio::test]
    async fn flag_overrides_round_trip() {
        let fx = fixture(BuildKind::Release, Tier::Unverified);

        let (status, body) = send(&fx.state, Method::GET, "/v1/feature-flags").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), GatedFeature::ALL.len());
        assert_eq!(flag(&body, "CHECKOUT")["enabled"], false);

        let (status, body) = send(
            &fx.state,
            Method::POST,
            "/v1/feature-flags/checkout/enable",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(flag(&body, "CHECKOUT")["enabled"], true);
        assert_eq!(flag(&body, "CHECKOUT")["overridden"], true);

        let (_, body) = send(
            &fx.state,
            Method::POST,
            "/v1/feature-flags/SINGLE_SIGN_ON/disable",
        )
        .await;
        assert_eq!(flag(&body, "SINGLE_SIGN_ON")["overridden"], false);

        let (status, body) = send(&fx.state, Method::DELETE, "/v1/feature-flags").await;
        assert_eq!(status, StatusCode::OK);
        for entry in body.as_array().unwrap() {
            assert_eq!(entry["enabled"], false);
            assert!(entry.get("overridden").is_none());
        }
    }

    #[tokio::test]
    async fn unknown_flag_is_not_found() {
        let fx = fixture(BuildKind::Release, Tier::Unverified);

        let (status, body) = send(
            &fx.state,
            Method::POST,
            "/v1/feature-flags/TELEPORT/enable",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error_code"], "unknown_feature");

        let (status, _) = send(&fx.state, Method::GET, "/v1/access/TELEPORT").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn access_check_reports_decision_source() {
        let fx = fixture(BuildKind::Release, Tier::Tier2);

        let (status, body) = send(&fx.state, Method::GET, "/v1/access/RECURRING_BUYS").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["feature"], "RECURRING_BUYS");
        assert_eq!(body["allowed"], true);
        assert_eq!(body["source"], "rollout");

        send(
            &fx.state,
            Method::POST,
            "/v1/feature-flags/RECURRING_BUYS/disable",
        )
        .await;
        let (_, body) = send(&fx.state, Method::GET, "/v1/access/RECURRING_BUYS").await;
        assert_eq!(body["allowed"], false);
        assert_eq!(body["source"], "override");
    }

    #[tokio::test]
    async fn session_tier_and_invalidation() {
        let fx = fixture(BuildKind::Release, Tier::Tier1);

        let (status, body) = send(&fx.state, Method::GET, "/v1/session/tier").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tier"], "tier1");

        fx.service.set_tier(Tier::Tier2);
        let (_, body) = send(&fx.state, Method::GET, "/v1/session/tier").await;
        assert_eq!(body["tier"], "tier1");

        let (status, _) = send(&fx.state, Method::POST, "/v1/session/tier/invalidate").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, body) = send(&fx.state, Method::GET, "/v1/session/tier").await;
        assert_eq!(body["tier"], "tier2");
    }

    #[tokio::test]
    async fn session_tier_surfaces_auth_errors() {
        let fx = fixture(BuildKind::Release, Tier::Tier1);
        fx.provider
            .fail_with(Some(AuthError::NetworkUnavailable("offline".to_string())));

        let (status, body) = send(&fx.state, Method::GET, "/v1/session/tier").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error_code"], "network_unavailable");
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let fx = fixture(BuildKind::Release, Tier::Unverified);
        let response = router(fx.state.clone())
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let fx = fixture(BuildKind::Release, Tier::Unverified);
        let (status, body) = send(&fx.state, Method::GET, "/api-doc/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/v1/access/{flag}"].is_object());
    }
}
