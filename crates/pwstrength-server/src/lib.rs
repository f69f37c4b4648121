//! Password strength prediction service
//!
//! Serves a trained [`StrengthModel`](pwstrength_classifiers::StrengthModel)
//! over HTTP:
//!
//! - `POST /predict` classifies `{"password": "..."}`
//! - `GET /health` liveness probe
//! - `GET /metrics` Prometheus exposition
//!
//! The model is loaded before the listener binds, so a running server always
//! has one to answer with.

pub mod routes;
pub mod state;

pub use routes::{create_router, PredictResponse, PredictionDetails};
pub use state::AppState;

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use pwstrength_core::ServerConfig;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

/// Bind and serve until SIGINT or SIGTERM
pub async fn run_server(state: AppState, config: &ServerConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.listen, config.port).parse()?;
    let app = create_router(state, config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Prediction service listening on http://{}", addr);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Install the global Prometheus recorder and describe the service metrics
pub fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "pwstrength_requests_total",
        "Total number of prediction requests received"
    );
    metrics::describe_counter!(
        "pwstrength_predictions_total",
        "Successful predictions by strength class"
    );
    metrics::describe_counter!("pwstrength_errors_total", "Rejected or failed requests by kind");
    metrics::describe_histogram!(
        "pwstrength_prediction_latency_us",
        metrics::Unit::Microseconds,
        "Feature extraction plus inference latency in microseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
