use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use credit_card_application::applications::{
    application_router, ApplicationRepository, CreditCardApplicationService, ReviewQueue,
};
use credit_card_application::error::AppError;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct ReferralSummary {
    pub(crate) application_id: String,
    pub(crate) decision: &'static str,
    pub(crate) rationale: String,
}

pub(crate) fn with_application_routes<R, Q>(
    service: Arc<CreditCardApplicationService<R, Q>>,
) -> axum::Router
where
    R: ApplicationRepository + 'static,
    Q: ReviewQueue + 'static,
{
    let referrals = service.clone();
    application_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/credit-card/referrals",
            axum::routing::get(move || referrals_endpoint(referrals.clone())),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

const REFERRAL_PAGE_SIZE: usize = 50;

pub(crate) async fn referrals_endpoint<R, Q>(
    service: Arc<CreditCardApplicationService<R, Q>>,
) -> Result<Json<Vec<ReferralSummary>>, AppError>
where
    R: ApplicationRepository + 'static,
    Q: ReviewQueue + 'static,
{
    let records = service.referred(REFERRAL_PAGE_SIZE)?;
    let summaries = records
        .into_iter()
        .map(|record| ReferralSummary {
            application_id: record.application_id.0.clone(),
            decision: record
                .evaluation
                .as_ref()
                .map(|outcome| outcome.decision.label())
                .unwrap_or("pending"),
            rationale: record.decision_rationale(),
        })
        .collect();
    Ok(Json(summaries))
}
