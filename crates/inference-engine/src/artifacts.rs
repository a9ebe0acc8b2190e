//! Model Artifact Loading
//!
//! Artifacts are loaded once at start-up into an immutable [`ModelBundle`]
//! that is shared by reference with every request.

use crate::model::{Classifier, LinearRegressor, LogisticClassifier, Regressor};
use crate::onnx::{OnnxClassifier, OnnxRegressor};
use crate::scaler::Scaler;
use crate::ConfigError;
use feature_engine::FeatureLayout;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where the artifacts live and how the regressor is fed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Eligibility classifier (`.onnx` or `.json`)
    pub classifier_path: PathBuf,
    /// Installment regressor (`.onnx` or `.json`)
    pub regressor_path: PathBuf,
    /// Scaler parameters (`.json`)
    pub scaler_path: PathBuf,
    /// Column layout the regressor was trained on
    pub regression_layout: FeatureLayout,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            classifier_path: PathBuf::from("models/emi_classifier.onnx"),
            regressor_path: PathBuf::from("models/emi_regressor.onnx"),
            scaler_path: PathBuf::from("models/scaler.json"),
            regression_layout: FeatureLayout::Regression,
        }
    }
}

/// Linear model artifacts identified by their `type` tag
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LinearArtifact {
    LogisticRegression(LogisticClassifier),
    LinearRegression(LinearRegressor),
}

impl LinearArtifact {
    fn kind(&self) -> &'static str {
        match self {
            LinearArtifact::LogisticRegression(_) => "logistic_regression",
            LinearArtifact::LinearRegression(_) => "linear_regression",
        }
    }

    fn width(&self) -> usize {
        match self {
            LinearArtifact::LogisticRegression(m) => m.coefficients.len(),
            LinearArtifact::LinearRegression(m) => m.coefficients.len(),
        }
    }
}

fn read_linear(path: &Path, expected: &'static str, width: usize) -> Result<LinearArtifact, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|e| ConfigError::Malformed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let found = match &value {
        Value::Object(map) => map.get("type").and_then(Value::as_str).map(str::to_string),
        Value::String(_) => Some("string".to_string()),
        _ => None,
    };
    let artifact = LinearArtifact::deserialize(value).map_err(|_| ConfigError::UnexpectedArtifact {
        path: path.to_path_buf(),
        expected,
        found: found.unwrap_or_else(|| "unrecognized value".to_string()),
    })?;

    if artifact.width() != width {
        return Err(ConfigError::WidthMismatch {
            path: path.to_path_buf(),
            expected: width,
            actual: artifact.width(),
        });
    }
    Ok(artifact)
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Load a classifier artifact by file extension
pub fn load_classifier(path: &Path, width: usize) -> Result<Box<dyn Classifier>, ConfigError> {
    match extension(path) {
        Some("onnx") => Ok(Box::new(OnnxClassifier::load(path, width)?)),
        Some("json") => match read_linear(path, "classifier", width)? {
            LinearArtifact::LogisticRegression(model) => Ok(Box::new(model)),
            other => Err(ConfigError::UnexpectedArtifact {
                path: path.to_path_buf(),
                expected: "classifier",
                found: other.kind().to_string(),
            }),
        },
        _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Load a regressor artifact by file extension
pub fn load_regressor(path: &Path, width: usize) -> Result<Box<dyn Regressor>, ConfigError> {
    match extension(path) {
        Some("onnx") => Ok(Box::new(OnnxRegressor::load(path, width)?)),
        Some("json") => match read_linear(path, "regressor", width)? {
            LinearArtifact::LinearRegression(model) => Ok(Box::new(model)),
            other => Err(ConfigError::UnexpectedArtifact {
                path: path.to_path_buf(),
                expected: "regressor",
                found: other.kind().to_string(),
            }),
        },
        _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// The loaded classifier, regressor and scaler
pub struct ModelBundle {
    pub classifier: Box<dyn Classifier>,
    pub regressor: Box<dyn Regressor>,
    pub scaler: Scaler,
    pub regression_layout: FeatureLayout,
}

impl ModelBundle {
    pub fn new(
        classifier: Box<dyn Classifier>,
        regressor: Box<dyn Regressor>,
        scaler: Scaler,
        regression_layout: FeatureLayout,
    ) -> Self {
        Self {
            classifier,
            regressor,
            scaler,
            regression_layout,
        }
    }

    /// Load every artifact named by the configuration.
    ///
    /// Any artifact that is missing, unreadable or of the wrong kind fails the load.
    pub fn load(config: &ModelConfig) -> Result<Self, ConfigError> {
        let classifier =
            load_classifier(&config.classifier_path, FeatureLayout::Classification.width())?;
        let regressor = load_regressor(&config.regressor_path, config.regression_layout.width())?;
        let scaler = Scaler::load(&config.scaler_path, FeatureLayout::Classification.width())?;

        info!(
            classifier = classifier.kind(),
            regressor = regressor.kind(),
            scaler = scaler.kind(),
            regression_layout = ?config.regression_layout,
            "Model bundle loaded"
        );

        Ok(Self::new(classifier, regressor, scaler, config.regression_layout))
    }
}

impl fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBundle")
            .field("classifier", &self.classifier.kind())
            .field("regressor", &self.regressor.kind())
            .field("scaler", &self.scaler)
            .field("regression_layout", &self.regression_layout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct TempDir(PathBuf);

    impl TempDir {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("emi-artifacts-{}-{}", name, std::process::id()));
            std::fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }

        fn write(&self, file: &str, value: &Value) -> PathBuf {
            let path = self.0.join(file);
            std::fs::write(&path, value.to_string()).unwrap();
            path
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.0).ok();
        }
    }

    fn logistic(width: usize) -> Value {
        json!({ "type": "logistic_regression", "coefficients": vec![0.0; width], "intercept": 0.0 })
    }

    fn linear(width: usize) -> Value {
        json!({ "type": "linear_regression", "coefficients": vec![0.0; width], "intercept": 1.0 })
    }

    #[test]
    fn test_load_json_bundle() {
        let dir = TempDir::new("bundle");
        let config = ModelConfig {
            classifier_path: dir.write("clf.json", &logistic(43)),
            regressor_path: dir.write("reg.json", &linear(42)),
            scaler_path: dir.write("scaler.json", &json!({ "mean": 0.0, "std": 1.0 })),
            regression_layout: FeatureLayout::Regression,
        };

        let bundle = ModelBundle::load(&config).unwrap();
        assert_eq!(bundle.classifier.kind(), "logistic_regression");
        assert_eq!(bundle.regressor.kind(), "linear_regression");
        assert_eq!(bundle.scaler.kind(), "mean_std");
    }

    #[test]
    fn test_regressor_in_classifier_slot() {
        let dir = TempDir::new("swapped");
        let path = dir.write("clf.json", &linear(43));
        let result = load_classifier(&path, 43);
        assert!(matches!(
            result,
            Err(ConfigError::UnexpectedArtifact { expected: "classifier", .. })
        ));
    }

    #[test]
    fn test_string_artifact_is_rejected() {
        let dir = TempDir::new("string");
        let path = dir.write("reg.json", &json!("EMI_regression_Best_Model"));
        match load_regressor(&path, 42) {
            Err(ConfigError::UnexpectedArtifact { found, .. }) => assert_eq!(found, "string"),
            other => panic!("unexpected result: {:?}", other.map(|r| r.kind())),
        }
    }

    #[test]
    fn test_width_checked_against_layout() {
        let dir = TempDir::new("width");
        let path = dir.write("reg.json", &linear(43));
        assert!(matches!(
            load_regressor(&path, FeatureLayout::Regression.width()),
            Err(ConfigError::WidthMismatch { expected: 42, actual: 43, .. })
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = load_classifier(Path::new("model.pkl"), 43);
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_narrow_scaler_fails_bundle() {
        let dir = TempDir::new("narrowscaler");
        let config = ModelConfig {
            classifier_path: dir.write("clf.json", &logistic(43)),
            regressor_path: dir.write("reg.json", &linear(42)),
            scaler_path: dir.write("scaler.json", &json!({ "mean": vec![0.0; 42], "std": vec![1.0; 42] })),
            regression_layout: FeatureLayout::Regression,
        };
        assert!(matches!(
            ModelBundle::load(&config),
            Err(ConfigError::WidthMismatch { expected: 43, actual: 42, .. })
        ));
    }

    #[test]
    fn test_missing_scaler_fails_bundle() {
        let dir = TempDir::new("noscaler");
        let config = ModelConfig {
            classifier_path: dir.write("clf.json", &logistic(43)),
            regressor_path: dir.write("reg.json", &linear(42)),
            scaler_path: dir.0.join("missing.json"),
            regression_layout: FeatureLayout::Regression,
        };
        assert!(matches!(ModelBundle::load(&config), Err(ConfigError::Io { .. })));
    }
}
