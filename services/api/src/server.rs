use crate::cli::ServeArgs;
use crate::infra::{AppState, Catalog};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use sekolah_okupasi::config::AppConfig;
use sekolah_okupasi::error::AppError;
use sekolah_okupasi::telemetry;
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
    if let Some(seed) = args.seed.take() {
        config.catalog.seed_path = Some(seed);
    }

    telemetry::init(&config.telemetry)?;

    let catalog = Catalog::bootstrap(config.catalog.seed_path.as_deref(), config.catalog.page_size)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        stats: catalog.stats.clone(),
    };

    let app = with_operational_routes(&catalog)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "occupation catalog ready");

    axum::serve(listener, app).await?;
    Ok(())
}
