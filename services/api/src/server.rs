use crate::cli::ServeArgs;
use crate::infra::{document_services, signature_service, AppState};
use crate::routes::with_compliance_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use workforce_compliance::config::AppConfig;
use workforce_compliance::context::RequestContext;
use workforce_compliance::error::AppError;
use workforce_compliance::telemetry;

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

    let documents = document_services(config.alerts.default_alert_days);
    let seeded = documents.catalog.seed_standard(&RequestContext::system())?;
    info!(seeded, "standard document catalog loaded");

    match config.alerts.scan_period() {
        Some(period) => {
            tokio::spawn(documents.alerts.clone().run_periodic(period));
            info!(interval_secs = config.alerts.scan_interval_secs, "expiry scan scheduled");
        }
        None => info!("background expiry scan disabled"),
    }

    let app = with_compliance_routes(documents, signature_service())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "workforce compliance service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
