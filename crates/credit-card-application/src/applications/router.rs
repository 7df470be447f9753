use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{ApplicationId, CreditCardApplication};
use super::repository::{ApplicationRepository, RepositoryError, ReviewQueue};
use super::service::{ApplicationServiceError, CreditCardApplicationService};

/// Router builder exposing HTTP endpoints for intake and evaluation.
pub fn application_router<R, Q>(service: Arc<CreditCardApplicationService<R, Q>>) -> Router
where
    R: ApplicationRepository + 'static,
    Q: ReviewQueue + 'static,
{
    Router::new()
        .route(
            "/api/v1/credit-card/applications",
            post(submit_handler::<R, Q>),
        )
        .route(
            "/api/v1/credit-card/applications/:application_id",
            get(status_handler::<R, Q>),
        )
        .route(
            "/api/v1/credit-card/applications/:application_id/evaluation",
            post(evaluate_handler::<R, Q>),
        )
        .route(
            "/api/v1/credit-card/validator/lookups",
            get(lookup_count_handler::<R, Q>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<R, Q>(
    State(service): State<Arc<CreditCardApplicationService<R, Q>>>,
    axum::Json(application): axum::Json<CreditCardApplication>,
) -> Response
where
    R: ApplicationRepository + 'static,
    Q: ReviewQueue + 'static,
{
    match service.submit(application) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::ACCEPTED, axum::Json(view)).into_response()
        }
        Err(ApplicationServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({
                "error": "application already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn evaluate_handler<R, Q>(
    State(service): State<Arc<CreditCardApplicationService<R, Q>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    Q: ReviewQueue + 'static,
{
    let id = ApplicationId(application_id);
    match service.evaluate(&id) {
        Ok(outcome) => {
            let payload = json!({
                "application_id": id.0,
                "decision": outcome.decision.label(),
                "rule": outcome.rule,
                "rationale": outcome.rationale(),
                "validation_mode": outcome.validation_mode.map(|mode| mode.label()),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(ApplicationServiceError::Repository(RepositoryError::NotFound)) => not_found(&id),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn status_handler<R, Q>(
    State(service): State<Arc<CreditCardApplicationService<R, Q>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    Q: ReviewQueue + 'static,
{
    let id = ApplicationId(application_id);
    match service.get(&id) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(ApplicationServiceError::Repository(RepositoryError::NotFound)) => not_found(&id),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn lookup_count_handler<R, Q>(
    State(service): State<Arc<CreditCardApplicationService<R, Q>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    Q: ReviewQueue + 'static,
{
    let payload = json!({ "lookup_count": service.validator_lookup_count() });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

fn not_found(id: &ApplicationId) -> Response {
    let payload = json!({
        "application_id": id.0,
        "error": "application not found",
    });
    (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
}

fn internal_error(error: ApplicationServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
