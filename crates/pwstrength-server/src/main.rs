//! Password strength prediction server

use anyhow::{Context, Result};
use clap::Parser;
use pwstrength_classifiers::{load_model_assets, StrengthClassifier};
use pwstrength_core::AppConfig;
use pwstrength_server::{init_metrics, run_server, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pwstrength-server")]
#[command(about = "Password strength prediction service", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml", env = "PWSTRENGTH_CONFIG")]
    config: PathBuf,

    /// Trained model file
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Feature list file
    #[arg(short, long)]
    features: Option<PathBuf>,

    /// Listen address
    #[arg(short = 'l', long)]
    listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "PWSTRENGTH_PORT")]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    info!("Starting password strength service");

    let mut config = AppConfig::load(&cli.config)?;
    if let Some(model) = cli.model {
        config.paths.model = model;
    }
    if let Some(features) = cli.features {
        config.paths.features = features;
    }
    if let Some(listen) = cli.listen {
        config.server.listen = listen;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let metrics_handle = init_metrics()?;

    let model = load_model_assets(&config.paths.model, &config.paths.features)
        .context("Model assets could not be loaded, refusing to start")?;
    info!("Serving model '{}'", model.name());

    let state = AppState::new(Arc::new(model), metrics_handle);
    run_server(state, &config.server).await
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::registry()
        .with(log_filter(verbose, rust_log.as_deref()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// `RUST_LOG` takes precedence over `--verbose` when it parses
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    if let Some(filter) = rust_log.and_then(|directives| EnvFilter::try_new(directives).ok()) {
        return filter;
    }
    if verbose {
        EnvFilter::new("pwstrength=debug,tower_http=debug")
    } else {
        EnvFilter::new("pwstrength=info")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_log_overrides_verbose() {
        assert_eq!(log_filter(true, Some("warn")).to_string(), "warn");
        assert_eq!(log_filter(false, Some("warn")).to_string(), "warn");
    }

    #[test]
    fn test_verbose_sets_default_filter() {
        assert!(log_filter(true, None).to_string().contains("pwstrength=debug"));
        assert!(log_filter(false, None).to_string().contains("pwstrength=info"));
    }
}
