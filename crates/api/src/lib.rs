//! EMI Eligibility API Server
//!
//! HTTP front end for the feature pipeline and the prediction engine.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use data_validator::Validator;
use inference_engine::InferenceEngine;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn, Level};

pub mod error;
pub mod rate_limit;
mod routes;
pub mod settings;

pub use error::{ApiError, ErrorResponse};
pub use settings::{LoggingSettings, ServerSettings, Settings};

/// Application state shared across handlers
pub struct AppState {
    /// Loaded models, shared read-only by every request
    pub engine: InferenceEngine,
    pub validator: Validator,
    /// Renders `/metrics`; absent when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(engine: InferenceEngine, validator: Validator) -> Self {
        Self {
            engine,
            validator,
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub models: ModelStatus,
}

/// Loaded artifact kinds
#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub classifier: &'static str,
    pub regressor: &'static str,
    pub scaler: &'static str,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/features", post(routes::features::engineer))
        .route("/api/v1/predict", post(routes::predictions::predict))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let bundle = state.engine.bundle();
    // Unscaled predictions are served but reported
    let status = if bundle.scaler.is_passthrough() {
        "degraded"
    } else {
        "healthy"
    };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        models: ModelStatus {
            classifier: bundle.classifier.kind(),
            regressor: bundle.regressor.kind(),
            scaler: bundle.scaler.kind(),
        },
    })
}

/// Prometheus scrape endpoint
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

/// Parse a configured level name, case-insensitively
fn max_level(level: &str) -> Option<Level> {
    level.parse().ok()
}

/// Initialize logging.
///
/// An unrecognized level falls back to info and is reported once the
/// subscriber is installed.
pub fn init_logging(settings: &LoggingSettings) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let level = max_level(&settings.level);
    let builder = tracing_subscriber::fmt()
        .with_max_level(level.unwrap_or(Level::INFO))
        .with_target(true);

    if settings.json {
        builder.json().try_init()?;
    } else {
        builder.try_init()?;
    }

    if level.is_none() {
        warn!(level = %settings.level, "Unknown logging level, using info");
    }
    Ok(())
}

/// Run the server until it fails
pub async fn run_server(settings: &ServerSettings, state: Arc<AppState>) -> anyhow::Result<()> {
    let mut app = create_router(state);

    match rate_limit::create_governor_config(&settings.rate_limit) {
        Some(config) => {
            let limiter = config.limiter().clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_secs(60));
                loop {
                    interval.tick().await;
                    limiter.retain_recent();
                }
            });
            info!(
                per_second = settings.rate_limit.per_second,
                burst_size = settings.rate_limit.burst_size,
                "Rate limiting enabled"
            );
            app = app.layer(GovernorLayer { config });
        }
        None if settings.rate_limit.enabled => {
            warn!("Rate limit quota is invalid, serving without rate limiting")
        }
        None => info!("Rate limiting disabled"),
    }

    info!("Starting API server on {}", settings.bind_addr);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
