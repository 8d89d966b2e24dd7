use metrics_exporter_prometheus::PrometheusHandle;
use provider_risk::backend::BackendClient;
use provider_risk::config::{AppConfig, BackendConfig};
use provider_risk::error::AppError;
use provider_risk::providers::{HttpProviderApi, ProviderDirectory};
use provider_risk::screening::{HttpRiskApi, ScreeningAggregator};
use provider_risk::telemetry::{self, LogSink};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Backend clients sharing one connection pool.
pub(crate) struct Backends {
    pub(crate) directory: Arc<ProviderDirectory<HttpProviderApi>>,
    pub(crate) aggregator: ScreeningAggregator<HttpRiskApi>,
}

impl Backends {
    pub(crate) fn connect(config: &BackendConfig) -> Self {
        let client = BackendClient::new(config);
        let providers = Arc::new(HttpProviderApi::new(client.clone()));
        let risk = Arc::new(HttpRiskApi::new(client));

        Self {
            directory: Arc::new(ProviderDirectory::new(providers)),
            aggregator: ScreeningAggregator::new(risk),
        }
    }
}

/// Configuration and clients for one-shot console commands. Logs go to
/// stderr so stdout carries only the rendered output.
pub(crate) fn console_backends() -> Result<Backends, AppError> {
    let config = AppConfig::load()?;
    telemetry::init_with_sink(&config.telemetry, LogSink::Stderr)?;
    Ok(Backends::connect(&config.backend))
}

pub(crate) fn parse_page(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(page) if page >= 1 => Ok(page),
        _ => Err(format!("'{raw}' is not a page number (1 or greater)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_start_at_one() {
        assert_eq!(parse_page("3"), Ok(3));
        assert_eq!(parse_page(" 1 "), Ok(1));
        assert!(parse_page("0").is_err());
        assert!(parse_page("last").is_err());
    }
}
