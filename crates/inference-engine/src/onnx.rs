//! ONNX Models via tract
//!
//! Expects graphs exported from scikit-learn style estimators: one `f32[1, n]`
//! input. Classifiers return a label tensor first and a `[1, 2]` probability
//! tensor second; regressors return a single `[1, 1]` value.

use crate::model::{Classifier, Regressor};
use crate::{ConfigError, InferenceError};
use std::path::Path;
use tract_onnx::prelude::*;
use tracing::{debug, info};

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

fn load_plan(path: &Path, width: usize) -> Result<(OnnxPlan, usize), ConfigError> {
    info!("Loading ONNX model {} with {} inputs", path.display(), width);

    let model_error = |e: TractError| ConfigError::ModelLoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let model = tract_onnx::onnx()
        .model_for_path(path)
        .and_then(|model| {
            model.with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), tvec!(1, width)))
        })
        .and_then(|model| model.into_optimized())
        .map_err(model_error)?;

    let outputs = model.outputs.len();
    let plan = model.into_runnable().map_err(model_error)?;
    Ok((plan, outputs))
}

fn run(plan: &OnnxPlan, width: usize, features: &[f64]) -> Result<TVec<TValue>, InferenceError> {
    if features.len() != width {
        return Err(InferenceError::InvalidInputShape {
            expected: width,
            actual: features.len(),
        });
    }

    let data: Vec<f32> = features.iter().map(|&v| v as f32).collect();
    let input = Tensor::from_shape(&[1, width], &data)
        .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

    plan.run(tvec!(input.into()))
        .map_err(|e| InferenceError::InferenceFailed(e.to_string()))
}

fn output_error(e: TractError) -> InferenceError {
    InferenceError::InvalidOutput(e.to_string())
}

/// Classifier backed by an ONNX graph
pub struct OnnxClassifier {
    plan: OnnxPlan,
    width: usize,
}

impl OnnxClassifier {
    /// Load a classifier graph; it must expose a probability output
    pub fn load(path: &Path, width: usize) -> Result<Self, ConfigError> {
        let (plan, outputs) = load_plan(path, width)?;
        if outputs < 2 {
            return Err(ConfigError::UnexpectedArtifact {
                path: path.to_path_buf(),
                expected: "classifier with label and probability outputs",
                found: format!("graph with {} output(s)", outputs),
            });
        }
        Ok(Self { plan, width })
    }

    fn label(outputs: &TVec<TValue>) -> Result<i64, InferenceError> {
        let labels = outputs[0].cast_to::<i64>().map_err(output_error)?;
        let label = labels
            .as_slice::<i64>()
            .map_err(output_error)?
            .first()
            .copied()
            .ok_or_else(|| InferenceError::InvalidOutput("empty label output".to_string()))?;
        debug!("ONNX classifier label {}", label);
        Ok(label)
    }

    fn probabilities(outputs: &TVec<TValue>) -> Result<[f64; 2], InferenceError> {
        let probabilities = outputs[1].cast_to::<f32>().map_err(output_error)?;
        let values = probabilities.as_slice::<f32>().map_err(output_error)?;
        match values {
            [p0, p1, ..] => Ok([f64::from(*p0), f64::from(*p1)]),
            _ => Err(InferenceError::InvalidOutput(format!(
                "expected 2 class probabilities, got {}",
                values.len()
            ))),
        }
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &[f64]) -> Result<i64, InferenceError> {
        let outputs = run(&self.plan, self.width, features)?;
        Self::label(&outputs)
    }

    fn predict_probability(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
        let outputs = run(&self.plan, self.width, features)?;
        Self::probabilities(&outputs)
    }

    fn predict_with_probability(&self, features: &[f64]) -> Result<(i64, [f64; 2]), InferenceError> {
        let outputs = run(&self.plan, self.width, features)?;
        Ok((Self::label(&outputs)?, Self::probabilities(&outputs)?))
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }
}

/// Regressor backed by an ONNX graph
pub struct OnnxRegressor {
    plan: OnnxPlan,
    width: usize,
}

impl OnnxRegressor {
    pub fn load(path: &Path, width: usize) -> Result<Self, ConfigError> {
        let (plan, _) = load_plan(path, width)?;
        Ok(Self { plan, width })
    }
}

impl Regressor for OnnxRegressor {
    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        let outputs = run(&self.plan, self.width, features)?;
        let values = outputs[0].cast_to::<f32>().map_err(output_error)?;
        values
            .as_slice::<f32>()
            .map_err(output_error)?
            .first()
            .map(|&v| f64::from(v))
            .ok_or_else(|| InferenceError::InvalidOutput("empty regression output".to_string()))
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }
}
