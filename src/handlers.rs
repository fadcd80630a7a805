// SPDX-License-Identifier: Apache-2.0

//! HTTP handlers for the token submission gate.
//!
//! Each route runs the same pipeline shape: derive the client IP, check the
//! route's rate limit policy under a route-prefixed identifier, then do the
//! route's work. The submit route additionally validates the payload and
//! enforces the per-(wallet, mint) cooldown before writing to the store.

use crate::clock::Clock;
use crate::config::Config;
use crate::cooldown::{CooldownError, CooldownGate};
use crate::limiter::RateLimiter;
use crate::store::SubmissionStore;
use crate::validator::SubmissionValidator;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared application state.
pub struct AppState {
    pub limiter: Arc<RateLimiter>,
    pub validator: SubmissionValidator,
    pub gate: CooldownGate,
    pub store: Arc<dyn SubmissionStore>,
    pub clock: Arc<dyn Clock>,
    pub config: Config,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/api/submit", post(submit))
        .route("/api/search", get(search))
        .route("/api/admin/login", post(admin_login))
        .with_state(state)
}

/// Client IP from proxy headers.
///
/// First entry of `X-Forwarded-For` when present, else `X-Real-IP`, else a
/// loopback placeholder for local development.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        return real_ip.to_string();
    }

    "127.0.0.1".to_string()
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "token-submission-gate",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Submit token metadata.
///
/// Pipeline: rate limit, validate, cooldown, insert. Each stage rejects with
/// its own status code; validation never reaches the store.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let ip = client_ip(&headers);
    let decision = state
        .limiter
        .check(&format!("submit:{ip}"), state.config.rate_limit.submit)
        .await;

    if !decision.allowed {
        let retry_after = decision.retry_after_secs(state.clock.now_ms());
        info!(%ip, retry_after, "submission rate limited");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [
                ("X-RateLimit-Limit", decision.limit.to_string()),
                ("X-RateLimit-Remaining", "0".to_string()),
                ("X-RateLimit-Reset", decision.reset_at_ms.to_string()),
                ("Retry-After", retry_after.to_string()),
            ],
            Json(json!({
                "error": "Too many requests",
                "message": "Please wait a moment before submitting again.",
                "retryAfter": retry_after,
            })),
        )
            .into_response();
    }

    let submission = match state.validator.validate(&body) {
        Ok(submission) => submission,
        Err(issues) => {
            let details: Vec<String> = issues.iter().map(ToString::to_string).collect();
            info!(%ip, ?details, "submission failed validation");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Validation failed",
                    "details": details,
                })),
            )
                .into_response();
        }
    };

    match state
        .gate
        .check(state.store.as_ref(), &submission.wallet, &submission.mint)
        .await
    {
        Ok(()) => {}
        Err(err @ CooldownError::Active { .. }) => {
            info!(%ip, wallet = %submission.wallet, mint = %submission.mint, "submission in cooldown");
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({
                    "error": "Too many updates",
                    "message": err.to_string(),
                })),
            )
                .into_response();
        }
        Err(err @ CooldownError::Unverifiable) => {
            error!(%ip, "cooldown check failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "cooldown_check_failed",
                    "message": err.to_string(),
                })),
            )
                .into_response();
        }
    }

    match state.store.insert(submission).await {
        Ok(row) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "submission": row,
            })),
        )
            .into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Failed to save submission",
            })),
        )
            .into_response(),
    }
}

/// Search approved tokens by name, symbol or mint.
pub async fn search(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Response {
    let ip = client_ip(&headers);
    let decision = state
        .limiter
        .check(&format!("search:{ip}"), state.config.rate_limit.search)
        .await;

    if !decision.allowed {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Too many requests",
                "message": "Please slow down.",
            })),
        )
            .into_response();
    }

    let query = params.q.trim();
    if query.len() < 2 {
        return Json(json!({ "results": [] })).into_response();
    }

    // Search degrades to empty results rather than surfacing store errors.
    match state.store.search_approved(query, 8).await {
        Ok(hits) => Json(json!({ "results": hits })).into_response(),
        Err(_) => {
            warn!(%ip, query, "search query failed");
            Json(json!({ "results": [] })).into_response()
        }
    }
}

/// Admin password gate.
pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let ip = client_ip(&headers);
    let decision = state
        .limiter
        .check(&format!("admin-login:{ip}"), state.config.rate_limit.login)
        .await;

    if !decision.allowed {
        warn!(%ip, "login attempts rate limited");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Too many login attempts",
                "message": "Please try again later.",
            })),
        )
            .into_response();
    }

    let Some(password) = body.get("password").and_then(Value::as_str) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid request" })),
        )
            .into_response();
    };

    let Some(expected) = state.config.admin_password.as_deref() else {
        error!("admin password is not configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Server configuration error" })),
        )
            .into_response();
    };

    if password == expected {
        Json(json!({ "success": true })).into_response()
    } else {
        info!(%ip, "incorrect admin password");
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Incorrect password" })),
        )
            .into_response()
    }
}
