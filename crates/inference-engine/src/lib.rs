//! EMI Inference Engine
//!
//! Scales an ordered feature vector and runs the eligibility classifier and
//! the installment regressor over it.

mod artifacts;
mod batcher;
mod engine;
mod model;
mod onnx;
mod scaler;

pub use artifacts::{ModelBundle, ModelConfig};
pub use batcher::predict_batch;
pub use engine::{
    Assessment, Decision, InferenceEngine, InferenceResult, Prediction, PredictionWarning,
};
pub use model::{Classifier, FeatureTransform, LinearRegressor, LogisticClassifier, Regressor};
pub use onnx::{OnnxClassifier, OnnxRegressor};
pub use scaler::{
    Broadcast, LearnedArtifact, MinMaxScaler, Scaled, Scaler, ScalerArtifact, StandardScaler,
};

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading model artifacts; fatal for the process
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed artifact {path}: {message}")]
    Malformed { path: PathBuf, message: String },
    #[error("Artifact {path} is a {found}, expected a {expected}")]
    UnexpectedArtifact {
        path: PathBuf,
        expected: &'static str,
        found: String,
    },
    #[error("Unsupported artifact format for {0}")]
    UnsupportedFormat(PathBuf),
    #[error("Model load failed for {path}: {message}")]
    ModelLoadError { path: PathBuf, message: String },
    #[error("Artifact {path} expects {actual} features, layout has {expected}")]
    WidthMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },
}

/// Errors during inference; terminal for the request
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
    #[error("Invalid model output: {0}")]
    InvalidOutput(String),
    #[error("Feature column {0} missing from input vector")]
    MissingColumn(feature_engine::FeatureColumn),
    #[error("Feature column {0} is not a finite number")]
    NonFiniteFeature(feature_engine::FeatureColumn),
    #[error("Transform failed: {0}")]
    TransformFailed(String),
}
