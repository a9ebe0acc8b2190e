//! Model Capabilities
//!
//! The engine only needs a prediction capability from its models. Concrete
//! backends are linear models read from JSON and ONNX graphs run with tract.

use crate::InferenceError;
use serde::{Deserialize, Serialize};

/// Binary classifier over a positional feature vector
pub trait Classifier: Send + Sync {
    /// Predicted class label
    fn predict(&self, features: &[f64]) -> Result<i64, InferenceError>;

    /// Class probabilities `[p0, p1]`
    fn predict_probability(&self, features: &[f64]) -> Result<[f64; 2], InferenceError>;

    /// Label and probabilities together; backends that produce both from
    /// one evaluation override this
    fn predict_with_probability(&self, features: &[f64]) -> Result<(i64, [f64; 2]), InferenceError> {
        Ok((self.predict(features)?, self.predict_probability(features)?))
    }

    /// Short backend name for diagnostics
    fn kind(&self) -> &'static str;
}

/// Regressor over a positional feature vector
pub trait Regressor: Send + Sync {
    /// Predicted continuous value
    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError>;

    /// Short backend name for diagnostics
    fn kind(&self) -> &'static str;
}

/// A learned transform applied before prediction
pub trait FeatureTransform: Send + Sync {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError>;

    /// Number of features the transform was fitted on
    fn width(&self) -> usize;

    /// Short name for diagnostics
    fn kind(&self) -> &'static str;
}

fn linear_term(coefficients: &[f64], intercept: f64, features: &[f64]) -> Result<f64, InferenceError> {
    if coefficients.len() != features.len() {
        return Err(InferenceError::InvalidInputShape {
            expected: coefficients.len(),
            actual: features.len(),
        });
    }
    Ok(coefficients
        .iter()
        .zip(features)
        .fold(intercept, |acc, (w, x)| acc + w * x))
}

/// Logistic regression classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticClassifier {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticClassifier {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    /// Signed distance to the decision boundary
    pub fn decision_function(&self, features: &[f64]) -> Result<f64, InferenceError> {
        linear_term(&self.coefficients, self.intercept, features)
    }
}

impl Classifier for LogisticClassifier {
    fn predict(&self, features: &[f64]) -> Result<i64, InferenceError> {
        Ok(i64::from(self.decision_function(features)? > 0.0))
    }

    fn predict_probability(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
        let z = self.decision_function(features)?;
        let p1 = 1.0 / (1.0 + (-z).exp());
        Ok([1.0 - p1, p1])
    }

    fn kind(&self) -> &'static str {
        "logistic_regression"
    }
}

/// Ordinary linear regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearRegressor {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }
}

impl Regressor for LinearRegressor {
    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        linear_term(&self.coefficients, self.intercept, features)
    }

    fn kind(&self) -> &'static str {
        "linear_regression"
    }
}
