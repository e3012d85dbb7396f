use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{ProjectId, ProjectStatus, ProjectSubmission};
use super::lifecycle::LifecycleError;
use super::marketplace::MarketplaceQuery;
use super::repository::{NoticePublisher, ProjectRepository, RepositoryError};
use super::service::{ProjectReviewService, ProjectServiceError};
use super::views::ProjectView;

/// Router builder exposing submission, review, queue, and marketplace endpoints.
pub fn project_router<R, N>(service: Arc<ProjectReviewService<R, N>>) -> Router
where
    R: ProjectRepository + 'static,
    N: NoticePublisher + 'static,
{
    Router::new()
        .route("/api/v1/projects", post(submit_handler::<R, N>))
        .route("/api/v1/projects/:project_id", get(project_handler::<R, N>))
        .route(
            "/api/v1/projects/:project_id/approve",
            post(approve_handler::<R, N>),
        )
        .route(
            "/api/v1/projects/:project_id/reject",
            post(reject_handler::<R, N>),
        )
        .route("/api/v1/review/queue", get(queue_handler::<R, N>))
        .route("/api/v1/review/statistics", get(statistics_handler::<R, N>))
        .route("/api/v1/marketplace", get(marketplace_handler::<R, N>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReviewRequest {
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct QueueParams {
    #[serde(default)]
    pub(crate) status: Option<String>,
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<ProjectReviewService<R, N>>>,
    axum::Json(submission): axum::Json<ProjectSubmission>,
) -> Response
where
    R: ProjectRepository + 'static,
    N: NoticePublisher + 'static,
{
    match service.submit(submission) {
        Ok(project) => (
            StatusCode::CREATED,
            axum::Json(ProjectView::from_project(project)),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn project_handler<R, N>(
    State(service): State<Arc<ProjectReviewService<R, N>>>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
    N: NoticePublisher + 'static,
{
    match service.get(&ProjectId(project_id)) {
        Ok(project) => (StatusCode::OK, axum::Json(ProjectView::from_project(project))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn approve_handler<R, N>(
    State(service): State<Arc<ProjectReviewService<R, N>>>,
    Path(project_id): Path<String>,
    body: Bytes,
) -> Response
where
    R: ProjectRepository + 'static,
    N: NoticePublisher + 'static,
{
    let request = match review_request(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match service.approve(&ProjectId(project_id), request.notes.as_deref()) {
        Ok(project) => (StatusCode::OK, axum::Json(ProjectView::from_project(project))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn reject_handler<R, N>(
    State(service): State<Arc<ProjectReviewService<R, N>>>,
    Path(project_id): Path<String>,
    body: Bytes,
) -> Response
where
    R: ProjectRepository + 'static,
    N: NoticePublisher + 'static,
{
    let request = match review_request(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let notes = request.notes.unwrap_or_default();
    match service.reject(&ProjectId(project_id), &notes) {
        Ok(project) => (StatusCode::OK, axum::Json(ProjectView::from_project(project))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn queue_handler<R, N>(
    State(service): State<Arc<ProjectReviewService<R, N>>>,
    Query(params): Query<QueueParams>,
) -> Response
where
    R: ProjectRepository + 'static,
    N: NoticePublisher + 'static,
{
    let status = match params.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => match ProjectStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                let payload = json!({ "error": format!("unknown status filter '{raw}'") });
                return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
            }
        },
    };

    match service.queue(status) {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn statistics_handler<R, N>(
    State(service): State<Arc<ProjectReviewService<R, N>>>,
) -> Response
where
    R: ProjectRepository + 'static,
    N: NoticePublisher + 'static,
{
    match service.statistics() {
        Ok(stats) => (StatusCode::OK, axum::Json(stats)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn marketplace_handler<R, N>(
    State(service): State<Arc<ProjectReviewService<R, N>>>,
    Query(query): Query<MarketplaceQuery>,
) -> Response
where
    R: ProjectRepository + 'static,
    N: NoticePublisher + 'static,
{
    match service.marketplace(&query) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

/// An empty body means "no notes"; anything else must be a valid review payload.
fn review_request(body: &Bytes) -> Result<ReviewRequest, Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ReviewRequest::default());
    }
    serde_json::from_slice(body).map_err(|err| {
        let payload = json!({ "error": format!("invalid review request body: {err}") });
        (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
    })
}

fn error_response(err: ProjectServiceError) -> Response {
    let status = match &err {
        ProjectServiceError::Lifecycle(LifecycleError::Validation(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ProjectServiceError::Lifecycle(LifecycleError::InvalidTransition { .. }) => {
            StatusCode::CONFLICT
        }
        ProjectServiceError::Lifecycle(LifecycleError::NotFound(_))
        | ProjectServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ProjectServiceError::Repository(
            RepositoryError::Conflict | RepositoryError::StaleStatus { .. },
        ) => StatusCode::CONFLICT,
        ProjectServiceError::Repository(RepositoryError::Unavailable(_)) => {
            error!(error = %err, "project repository failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
