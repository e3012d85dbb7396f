use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use carbon_market::config::AppConfig;
use carbon_market::error::AppError;
use carbon_market::telemetry;
use carbon_market::workflows::projects::{
    ListingTermsBook, ProjectCsvImporter, ProjectReviewService,
};
use tracing::info;

use crate::cli::ServeArgs;
use crate::infra::{
    build_ledger_service, AppState, InMemoryNoticePublisher, InMemoryProjectRepository,
};
use crate::routes::with_market_routes;

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
    let readiness = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryProjectRepository::default());
    if let Some(path) = args.seed_csv.take() {
        let projects = ProjectCsvImporter::from_path(&path)?;
        let seeded = repository.seed(projects)?;
        info!(path = %path.display(), seeded, "project snapshot loaded");
    }

    let reviews = Arc::new(ProjectReviewService::new(
        repository,
        Arc::new(InMemoryNoticePublisher::default()),
        ListingTermsBook::new(config.marketplace.listing_terms()),
    ));
    let (ledger, _) = build_ledger_service(&config)?;

    let app = with_market_routes(reviews, ledger)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        chain_id = config.ledger.chain_id,
        "carbon market service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
