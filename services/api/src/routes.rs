use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use carbon_market::workflows::ledger::{ledger_router, ContentPinner, CreditLedger, LedgerService, WalletGateway};
use carbon_market::workflows::projects::{
    project_router, NoticePublisher, ProjectRepository, ProjectReviewService,
};
use serde_json::json;

use crate::infra::AppState;

/// Merges the review, marketplace, and ledger routers with the health and metrics endpoints.
pub(crate) fn with_market_routes<R, N, L, P>(
    reviews: Arc<ProjectReviewService<R, N>>,
    ledger: Arc<LedgerService<L, P>>,
) -> Router
where
    R: ProjectRepository + 'static,
    N: NoticePublisher + 'static,
    L: CreditLedger + WalletGateway + 'static,
    P: ContentPinner + 'static,
{
    project_router(reviews)
        .merge(ledger_router(ledger))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(Ordering::Acquire) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
