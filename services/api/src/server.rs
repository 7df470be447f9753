use crate::cli::ServeArgs;
use crate::infra::{build_evaluator, AppState, InMemoryApplicationRepository, InMemoryReviewQueue};
use crate::routes::with_application_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use credit_card_application::applications::CreditCardApplicationService;
use credit_card_application::config::AppConfig;
use credit_card_application::error::AppError;
use credit_card_application::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let evaluator = build_evaluator(
        &config.validator.license_key,
        config.evaluation.clone(),
        true,
    )?;
    let application_service = Arc::new(CreditCardApplicationService::new(
        Arc::new(evaluator),
        Arc::new(InMemoryApplicationRepository::default()),
        Arc::new(InMemoryReviewQueue::default()),
    ));

    let app = with_application_routes(application_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        high_income_threshold = config.evaluation.high_income_threshold,
        "credit card application evaluator ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
