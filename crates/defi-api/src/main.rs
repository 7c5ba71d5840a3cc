//! DeFi 대시보드 API 서버.
//!
//! 업스트림 분석 API 응답을 캐싱/정규화하여 대시보드 프론트엔드에 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use defi_api::{create_app, serve, AppState};
use defi_core::{init_logging, AppConfig, LogConfig};
use defi_data::{DefiDataManager, HttpUpstream};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load_default()?;
    init_logging(LogConfig::from_settings(&config.logging))?;

    info!(
        api_base_url = %config.upstream.api_base_url,
        yields_base_url = %config.upstream.yields_base_url,
        ttl_secs = config.cache.ttl_secs,
        max_concurrency = config.aggregator.max_concurrency,
        "Starting DeFi dashboard API server"
    );

    let upstream = Arc::new(HttpUpstream::from_config(&config.upstream)?);
    let data = Arc::new(DefiDataManager::new(&config, upstream));
    let state = Arc::new(AppState::new(data));

    let app = create_app(state, &config.server);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");

    serve(listener, app, shutdown_signal()).await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
