//! Market Movers Binary
//!
//! Starts the movers HTTP API.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin market-movers
//! ```
//!
//! # Environment Variables
//!
//! - `MOVERS_HTTP_PORT`: HTTP port (default: 8080)
//! - `MOVERS_REQUEST_TIMEOUT_SECS`: Per-request handling timeout (default: 10)
//! - `MOVERS_FETCH_TIMEOUT_SECS`: Outbound fetch timeout (default: 5)
//! - `MOVERS_GAINERS_URL_TEMPLATE`: Gainers page template with `{year}`, `{month}`, `{day}`
//! - `MOVERS_LOSERS_URL_TEMPLATE`: Losers page template with `{year}`, `{month}`, `{day}`
//! - `MOVERS_USER_AGENT`: User-Agent for outbound fetches
//! - `OTEL_ENABLED`: Export spans over OTLP (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4317>)
//! - `OTEL_SERVICE_NAME`: Service name (default: market-movers)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use market_movers::infrastructure::telemetry;
use market_movers::{
    AppState, HttpDocumentFetcher, HttpServer, MoversService, ServiceConfig, SourceLocator,
    SystemClock, create_router, init_metrics,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_ancestors();

    let _telemetry_guard = telemetry::init().context("failed to initialize telemetry")?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Market Movers");

    let _metrics_handle = init_metrics().context("failed to install metrics recorder")?;

    let config = ServiceConfig::from_env().context("invalid configuration")?;
    log_config(&config);

    let locator = SourceLocator::new(config.templates.clone(), Arc::new(SystemClock));
    let fetcher =
        HttpDocumentFetcher::new(&config.fetcher).context("failed to build HTTP client")?;
    let service = Arc::new(MoversService::new(locator, Arc::new(fetcher)));

    let state = AppState::new(service, env!("CARGO_PKG_VERSION"))
        .with_request_timeout(config.server.request_timeout);
    let router = create_router(state);

    let shutdown_token = CancellationToken::new();
    let server = HttpServer::new(config.server.http_port, router, shutdown_token.clone());
    let mut server_handle = tokio::spawn(server.run());

    tokio::select! {
        () = await_shutdown(shutdown_token.clone()) => {}
        result = &mut server_handle => {
            result.context("HTTP server task failed")??;
            return Ok(());
        }
    }

    match tokio::time::timeout(SHUTDOWN_TIMEOUT, server_handle).await {
        Ok(result) => result.context("HTTP server task failed")??,
        Err(_) => tracing::warn!("Shutdown timed out with requests still in flight"),
    }

    tracing::info!("Market Movers stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &ServiceConfig) {
    tracing::info!(
        http_port = config.server.http_port,
        request_timeout_secs = config.server.request_timeout.as_secs(),
        fetch_timeout_secs = config.fetcher.timeout.as_secs(),
        "Configuration loaded"
    );
    tracing::debug!(
        gainers = %config.templates.gainers,
        losers = %config.templates.losers,
        user_agent = %config.fetcher.user_agent,
        "Source templates"
    );
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv_from_ancestors() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();

    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );
}
