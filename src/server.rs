use crate::cli::ServeArgs;
use crate::routes::{with_operational_routes, AppState};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use lernprofil::config::AppConfig;
use lernprofil::error::AppError;
use lernprofil::telemetry;
use lernprofil::workflows::profile::{ItemRegistry, ProfileAssembler};
use std::sync::atomic::{AtomicBool, Ordering};
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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let registry = Arc::new(ItemRegistry::standard()?);
    info!(
        items = registry.len(),
        main_scale = registry.main_scale_count(),
        additional = registry.additional_count(),
        "item registry loaded"
    );
    let assembler = Arc::new(ProfileAssembler::new(registry, config.scoring));

    let app = with_operational_routes(assembler)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "learning profile service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
