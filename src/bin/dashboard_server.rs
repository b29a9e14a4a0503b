use std::{net::SocketAddr, sync::Arc};

use storeboard::{
    dashboard_router, init_logging, loader_config_from_env, log_app_bind, log_app_start,
    logging_config_from_env, AppState, LoggingBidChangeSink, SnapshotLoader,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_cfg = logging_config_from_env();
    init_logging(&logging_cfg)?;
    log_app_start(&logging_cfg);

    let addr: SocketAddr = std::env::var("STOREBOARD_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
        .parse()?;

    let snapshots = SnapshotLoader::spawn_refresh(loader_config_from_env())?;
    let state = AppState::new(snapshots, Arc::new(LoggingBidChangeSink::default()));

    let app = dashboard_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    log_app_bind(bound_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
