use crate::cli::ServeArgs;
use crate::infra::{AppState, Backends};
use crate::routes::with_api_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use provider_risk::config::AppConfig;
use provider_risk::error::AppError;
use provider_risk::screening::ScreeningService;
use provider_risk::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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

    let Backends {
        directory,
        aggregator,
    } = Backends::connect(&config.backend);

    // The backend may come up after us; the list reloads on every request.
    match directory.reload().await {
        Ok(count) => info!(count, "provider directory primed"),
        Err(error) => warn!(%error, "provider directory unavailable at startup"),
    }

    let screening_service = Arc::new(ScreeningService::new(aggregator, directory.clone()));

    let app = with_api_routes(directory, screening_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        backend = %config.backend.base_url,
        "provider risk console ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
