//! Health check endpoints

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use super::ApiState;
use crate::catalog::Category;

/// User id read by the readiness probe; never written
const PROBE_USER_ID: &str = "__readiness_probe__";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Detailed readiness response
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub checks: ReadinessChecks,
}

/// Individual readiness checks
#[derive(Serialize)]
pub struct ReadinessChecks {
    pub store: CheckResult,
    pub catalog: CheckResult,
}

/// Result of a single health check
#[derive(Serialize)]
pub struct CheckResult {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckResult {
    const fn ok() -> Self {
        Self {
            status: "ok",
            message: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            status: "fail",
            message: Some(message.into()),
        }
    }

    fn passed(&self) -> bool {
        self.status == "ok"
    }
}

/// Liveness probe - is the service running?
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness probe - can the service answer voice turns?
async fn ready(State(state): State<Arc<ApiState>>) -> (StatusCode, Json<ReadinessResponse>) {
    let store_check = check_store(&state).await;
    let catalog_check = check_catalog(&state);

    let all_ok = store_check.passed() && catalog_check.passed();

    let status = if all_ok { "ok" } else { "degraded" };
    let http_status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        http_status,
        Json(ReadinessResponse {
            status,
            checks: ReadinessChecks {
                store: store_check,
                catalog: catalog_check,
            },
        }),
    )
}

/// Check the preference store answers reads
async fn check_store(state: &ApiState) -> CheckResult {
    match state.handler.store().get(PROBE_USER_ID).await {
        Ok(_) => CheckResult::ok(),
        Err(e) => CheckResult::fail(e.to_string()),
    }
}

/// Check the catalog has lines and stops to resolve against
fn check_catalog(state: &ApiState) -> CheckResult {
    let catalog = state.handler.catalog();
    let lines = catalog.entries(Category::Line).count();
    let stops = catalog.entries(Category::Stop).count();

    if lines == 0 || stops == 0 {
        return CheckResult::fail(format!("catalog has {lines} lines and {stops} stops"));
    }
    tracing::trace!(lines, stops, "catalog ready");
    CheckResult::ok()
}

/// Build health router (liveness only, no state needed)
pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

/// Build readiness router
pub fn ready_router(state: Arc<ApiState>) -> Router {
    Router::new().route("/ready", get(ready)).with_state(state)
}
