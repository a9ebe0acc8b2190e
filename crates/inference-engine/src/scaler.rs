//! Feature Scaling
//!
//! The scaler shape is decided once, when the artifact is loaded. An artifact
//! that parses but has no recognizable shape becomes a passthrough that the
//! engine reports as a degraded prediction on every request.

use crate::model::FeatureTransform;
use crate::{ConfigError, InferenceError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// Standardization learned at training time: `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl FeatureTransform for StandardScaler {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width(self.mean.len(), features.len())?;
        Ok(standardize(features, &self.mean, &self.scale))
    }

    fn width(&self) -> usize {
        self.mean.len()
    }

    fn kind(&self) -> &'static str {
        "standard_scaler"
    }
}

/// Range scaling learned at training time: `x * scale + min`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub min: Vec<f64>,
    pub scale: Vec<f64>,
}

impl FeatureTransform for MinMaxScaler {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width(self.min.len(), features.len())?;
        Ok(features
            .iter()
            .zip(self.scale.iter().zip(&self.min))
            .map(|(x, (scale, min))| x * scale + min)
            .collect())
    }

    fn width(&self) -> usize {
        self.min.len()
    }

    fn kind(&self) -> &'static str {
        "min_max_scaler"
    }
}

fn check_width(expected: usize, actual: usize) -> Result<(), InferenceError> {
    if expected == actual {
        Ok(())
    } else {
        Err(InferenceError::InvalidInputShape { expected, actual })
    }
}

fn standardize(features: &[f64], mean: &[f64], std: &[f64]) -> Vec<f64> {
    features
        .iter()
        .zip(mean.iter().zip(std))
        .map(|(x, (m, s))| (x - m) / s)
        .collect()
}

/// Transform artifacts identified by their `type` tag
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LearnedArtifact {
    StandardScaler(StandardScaler),
    MinMaxScaler(MinMaxScaler),
}

/// Every shape a scaler file may take
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScalerArtifact {
    /// A fitted transform object
    Learned(LearnedArtifact),
    /// Row 0 is the per-feature mean, row 1 the per-feature standard deviation
    Matrix(Vec<Vec<f64>>),
    /// Explicit mean and standard deviation entries, per feature or shared
    MeanStd { mean: Broadcast, std: Broadcast },
    /// Anything else that is valid JSON
    Unrecognized(Value),
}

/// A per-feature vector, or one value shared by every feature
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Broadcast {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl Broadcast {
    fn len(&self) -> Option<usize> {
        match self {
            Broadcast::Scalar(_) => None,
            Broadcast::Vector(values) => Some(values.len()),
        }
    }

    fn into_vec(self, width: usize) -> Vec<f64> {
        match self {
            Broadcast::Scalar(value) => vec![value; width],
            Broadcast::Vector(values) => values,
        }
    }
}

/// Scaling applied to the classification-layout vector
pub enum Scaler {
    Learned(Box<dyn FeatureTransform>),
    MeanStd { mean: Vec<f64>, std: Vec<f64> },
    Passthrough { reason: String },
}

/// Output of [`Scaler::apply`]
#[derive(Debug, Clone, PartialEq)]
pub struct Scaled {
    pub values: Vec<f64>,
    /// Why the raw values were passed through, when they were
    pub degraded: Option<String>,
}

impl Scaler {
    /// Pick the scaler variant for a parsed artifact.
    ///
    /// Shared mean or std values are repeated across `width` features, or
    /// across the other entry's length when only one of them is shared.
    pub fn from_artifact(artifact: ScalerArtifact, width: usize) -> Self {
        match artifact {
            ScalerArtifact::Learned(LearnedArtifact::StandardScaler(scaler)) => {
                if scaler.mean.len() == scaler.scale.len() {
                    Scaler::Learned(Box::new(scaler))
                } else {
                    Self::passthrough("standard scaler mean and scale lengths differ")
                }
            }
            ScalerArtifact::Learned(LearnedArtifact::MinMaxScaler(scaler)) => {
                if scaler.min.len() == scaler.scale.len() {
                    Scaler::Learned(Box::new(scaler))
                } else {
                    Self::passthrough("min-max scaler min and scale lengths differ")
                }
            }
            ScalerArtifact::Matrix(mut rows) => {
                if rows.len() == 2 && rows[0].len() == rows[1].len() {
                    let std = rows.pop().unwrap_or_default();
                    let mean = rows.pop().unwrap_or_default();
                    Scaler::MeanStd { mean, std }
                } else {
                    Self::passthrough(format!(
                        "unknown scaler array format with {} row(s)",
                        rows.len()
                    ))
                }
            }
            ScalerArtifact::MeanStd { mean, std } => {
                let len = mean.len().or(std.len()).unwrap_or(width);
                let mean = mean.into_vec(len);
                let std = std.into_vec(len);
                if mean.len() == std.len() {
                    Scaler::MeanStd { mean, std }
                } else {
                    Self::passthrough("scaler mean and std lengths differ")
                }
            }
            ScalerArtifact::Unrecognized(value) => {
                Self::passthrough(format!("unknown scaler type: {}", json_kind(&value)))
            }
        }
    }

    /// Read a JSON scaler artifact for a layout of `width` features.
    ///
    /// A usable scaler fitted on a different number of features is a
    /// configuration error.
    pub fn load(path: &Path, width: usize) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|e| ConfigError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if let Value::String(_) = value {
            return Err(ConfigError::UnexpectedArtifact {
                path: path.to_path_buf(),
                expected: "scaler",
                found: "string".to_string(),
            });
        }

        let artifact = ScalerArtifact::deserialize(value).map_err(|e| ConfigError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let scaler = Self::from_artifact(artifact, width);

        if let Some(actual) = scaler.width().filter(|&actual| actual != width) {
            return Err(ConfigError::WidthMismatch {
                path: path.to_path_buf(),
                expected: width,
                actual,
            });
        }

        match &scaler {
            Scaler::Passthrough { reason } => {
                warn!("Scaler {} not usable ({}), features will be unscaled", path.display(), reason)
            }
            _ => info!("Loaded {} from {}", scaler.kind(), path.display()),
        }
        Ok(scaler)
    }

    fn passthrough(reason: impl Into<String>) -> Self {
        Scaler::Passthrough {
            reason: reason.into(),
        }
    }

    /// Short name for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Scaler::Learned(transform) => transform.kind(),
            Scaler::MeanStd { .. } => "mean_std",
            Scaler::Passthrough { .. } => "passthrough",
        }
    }

    /// Number of features the scaler was fitted on, if it has one
    pub fn width(&self) -> Option<usize> {
        match self {
            Scaler::Learned(transform) => Some(transform.width()),
            Scaler::MeanStd { mean, .. } => Some(mean.len()),
            Scaler::Passthrough { .. } => None,
        }
    }

    /// Whether every prediction will run on unscaled features
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Scaler::Passthrough { .. })
    }

    /// Scale a vector, falling back to the raw values when scaling is not possible
    pub fn apply(&self, features: &[f64]) -> Scaled {
        let result = match self {
            Scaler::Learned(transform) => transform.transform(features),
            Scaler::MeanStd { mean, std } => check_width(mean.len(), features.len())
                .map(|()| standardize(features, mean, std)),
            Scaler::Passthrough { reason } => {
                return Scaled {
                    values: features.to_vec(),
                    degraded: Some(reason.clone()),
                }
            }
        };

        match result {
            Ok(values) => Scaled {
                values,
                degraded: None,
            },
            Err(e) => Scaled {
                values: features.to_vec(),
                degraded: Some(format!("scaling failed: {}", e)),
            },
        }
    }
}

impl fmt::Debug for Scaler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scaler::Learned(transform) => f
                .debug_struct("Learned")
                .field("kind", &transform.kind())
                .field("width", &transform.width())
                .finish(),
            Scaler::MeanStd { mean, .. } => {
                f.debug_struct("MeanStd").field("width", &mean.len()).finish()
            }
            Scaler::Passthrough { reason } => {
                f.debug_struct("Passthrough").field("reason", reason).finish()
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Scaler {
        parse_for(value, 3)
    }

    fn parse_for(value: Value, width: usize) -> Scaler {
        Scaler::from_artifact(serde_json::from_value(value).unwrap(), width)
    }

    fn write_temp(name: &str, value: &Value) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("emi-scaler-{}-{}.json", name, std::process::id()));
        std::fs::write(&path, value.to_string()).unwrap();
        path
    }

    #[test]
    fn test_mapping_and_matrix_agree() {
        let features = [50_000.0, 0.2, 4.0];
        let mean = [40_000.0, 0.25, 3.1];
        let std = [12_500.0, 0.07, 1.3];

        let from_map = parse(json!({ "mean": mean, "std": std }));
        let from_matrix = parse(json!([mean, std]));

        let a = from_map.apply(&features);
        let b = from_matrix.apply(&features);
        assert_eq!(a.degraded, None);
        assert_eq!(a.values, b.values);
        assert_eq!(a.values[0], (50_000.0 - 40_000.0) / 12_500.0);
        for (x, y) in a.values.iter().zip(&b.values) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn test_standard_scaler_artifact() {
        let scaler = parse(json!({
            "type": "standard_scaler",
            "mean": [1.0, 2.0],
            "scale": [2.0, 4.0]
        }));
        assert_eq!(scaler.kind(), "standard_scaler");
        assert_eq!(scaler.apply(&[3.0, 10.0]).values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_min_max_scaler_artifact() {
        let scaler = parse(json!({
            "type": "min_max_scaler",
            "min": [-1.0, 0.0],
            "scale": [0.5, 0.1]
        }));
        assert_eq!(scaler.kind(), "min_max_scaler");
        assert_eq!(scaler.apply(&[4.0, 10.0]).values, vec![1.0, 1.0]);
    }

    #[test]
    fn test_three_row_matrix_is_passthrough() {
        let scaler = parse(json!([[1.0], [2.0], [3.0]]));
        assert!(scaler.is_passthrough());

        let scaled = scaler.apply(&[7.0]);
        assert_eq!(scaled.values, vec![7.0]);
        assert!(scaled.degraded.unwrap().contains("3 row"));
    }

    #[test]
    fn test_unknown_object_is_passthrough() {
        let scaler = parse(json!({ "type": "robust_scaler", "center": [0.0] }));
        assert!(scaler.is_passthrough());
        assert_eq!(scaler.kind(), "passthrough");
    }

    #[test]
    fn test_width_mismatch_degrades_to_raw() {
        let scaler = parse(json!({ "mean": [0.0, 0.0], "std": [1.0, 1.0] }));
        let scaled = scaler.apply(&[5.0, 6.0, 7.0]);
        assert_eq!(scaled.values, vec![5.0, 6.0, 7.0]);
        assert!(scaled.degraded.is_some());
    }

    #[test]
    fn test_scalar_mean_std_broadcasts() {
        let scaler = parse_for(json!({ "mean": 1.0, "std": 2.0 }), 2);
        assert_eq!(scaler.kind(), "mean_std");
        assert_eq!(scaler.width(), Some(2));

        let scaled = scaler.apply(&[5.0, 3.0]);
        assert_eq!(scaled.degraded, None);
        assert_eq!(scaled.values, vec![2.0, 1.0]);
    }

    #[test]
    fn test_scalar_std_follows_mean_length() {
        let scaler = parse_for(json!({ "mean": [1.0, 2.0, 3.0], "std": 2.0 }), 43);
        assert_eq!(scaler.width(), Some(3));
        assert_eq!(scaler.apply(&[3.0, 4.0, 5.0]).values, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_load_rejects_string_artifact() {
        let path = write_temp("string", &json!("corrupted"));
        let result = Scaler::load(&path, 3);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ConfigError::UnexpectedArtifact { .. })));
    }

    #[test]
    fn test_load_rejects_width_mismatch() {
        let path = write_temp("narrow", &json!({ "mean": vec![0.0; 42], "std": vec![1.0; 42] }));
        let result = Scaler::load(&path, 43);
        std::fs::remove_file(&path).ok();
        assert!(matches!(
            result,
            Err(ConfigError::WidthMismatch { expected: 43, actual: 42, .. })
        ));
    }

    #[test]
    fn test_load_keeps_passthrough() {
        let path = write_temp("unknown", &json!(7));
        let result = Scaler::load(&path, 43);
        std::fs::remove_file(&path).ok();
        assert!(result.unwrap().is_passthrough());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Scaler::load(Path::new("no/such/scaler.json"), 43);
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
