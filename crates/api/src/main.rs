//! EMI Eligibility Service - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, AppState, Settings};
use data_validator::Validator;
use inference_engine::InferenceEngine;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load settings")?;
    init_logging(&settings.logging)
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {}", e))?;

    info!("=== EMI Eligibility Service v{} ===", env!("CARGO_PKG_VERSION"));

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install metrics recorder")?;

    let engine = InferenceEngine::load(&settings.models).context("failed to load models")?;
    let validator = Validator::new(settings.validation.clone());
    let state = Arc::new(AppState::new(engine, validator).with_metrics(metrics));

    run_server(&settings.server, state).await
}
