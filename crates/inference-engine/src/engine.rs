//! Inference Engine Implementation

use crate::artifacts::{ModelBundle, ModelConfig};
use crate::{ConfigError, InferenceError};
use feature_engine::{engineer_features, EngineeredRecord, FeatureLayout, FeatureVector, RawInput};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Eligibility decision derived from the classifier label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    /// Label 1 approves; every other label rejects
    pub fn from_label(label: i64) -> Self {
        if label == 1 {
            Decision::Approved
        } else {
            Decision::Rejected
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Rejected => "rejected",
        }
    }

    /// Advice shown alongside the decision
    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            Decision::Approved => &[
                "Your EMI application is likely to be approved",
                "Ensure timely repayment to maintain good credit score",
                "Consider building emergency fund to 6 months of expenses",
            ],
            Decision::Rejected => &[
                "Consider improving your credit score",
                "Reduce monthly expenses to increase savings capacity",
                "Build a stronger emergency fund before applying",
                "Consider requesting a lower loan amount",
            ],
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal conditions the caller must be told about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionWarning {
    /// Models ran on raw, unscaled features
    UnscaledFeatures { reason: String },
}

impl fmt::Display for PredictionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionWarning::UnscaledFeatures { reason } => {
                write!(f, "features were not scaled: {}", reason)
            }
        }
    }
}

/// Prediction result from inference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub decision: Decision,
    /// Probability of the reported decision (0.0 to 1.0)
    pub probability: f64,
    /// Classifier probabilities `[rejected, approved]`
    pub class_probabilities: [f64; 2],
    /// Recommended monthly installment, in the salary's currency unit
    pub predicted_emi: f64,
}

/// Result of inference operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceResult {
    /// The prediction
    pub prediction: Prediction,
    /// Degraded paths taken while producing it
    pub warnings: Vec<PredictionWarning>,
    /// Inference latency in milliseconds
    pub latency_ms: u64,
}

impl InferenceResult {
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Prediction together with the record it was computed from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub result: InferenceResult,
    pub record: EngineeredRecord,
}

/// Runs the scaler, classifier and regressor over engineered features
pub struct InferenceEngine {
    bundle: ModelBundle,
}

impl InferenceEngine {
    /// Create an engine over already loaded models
    pub fn new(bundle: ModelBundle) -> Self {
        info!("Creating inference engine: {:?}", bundle);
        Self { bundle }
    }

    /// Load the models named by the configuration
    pub fn load(config: &ModelConfig) -> Result<Self, ConfigError> {
        ModelBundle::load(config).map(Self::new)
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    /// Engineer, predict and keep the record for display
    pub fn assess(&self, raw: &RawInput) -> Result<Assessment, InferenceError> {
        let record = engineer_features(raw);
        let features = FeatureVector::extract(&record, FeatureLayout::Classification);
        let result = self.predict(&features)?;
        Ok(Assessment { result, record })
    }

    /// Run inference on a feature vector.
    ///
    /// The vector is re-ordered by column name onto the classification layout,
    /// scaled, then projected by name onto the regressor's layout.
    pub fn predict(&self, features: &FeatureVector) -> Result<InferenceResult, InferenceError> {
        let start = std::time::Instant::now();

        let outcome = self.run(features).map_err(|e| {
            counter!("emi_prediction_failures_total").increment(1);
            warn!("Prediction failed: {}", e);
            e
        })?;

        let elapsed = start.elapsed();
        let latency_ms = elapsed.as_millis() as u64;
        let prediction = outcome.prediction;
        counter!("emi_predictions_total", "decision" => prediction.decision.as_str()).increment(1);
        histogram!("emi_inference_latency_seconds").record(elapsed.as_secs_f64());

        let mut warnings = Vec::new();
        if let Some(reason) = outcome.unscaled {
            counter!("emi_scaling_degraded_total").increment(1);
            warn!("Predicting on unscaled features: {}", reason);
            warnings.push(PredictionWarning::UnscaledFeatures { reason });
        }

        debug!(
            "Prediction {} (p={:.3}, emi={:.2}) in {}ms",
            prediction.decision, prediction.probability, prediction.predicted_emi, latency_ms
        );

        Ok(InferenceResult {
            prediction,
            warnings,
            latency_ms,
        })
    }

    fn run(&self, features: &FeatureVector) -> Result<Outcome, InferenceError> {
        let ordered = features
            .project(FeatureLayout::Classification)
            .map_err(InferenceError::MissingColumn)?;
        if let Some((&column, _)) = ordered
            .columns()
            .iter()
            .zip(ordered.values())
            .find(|(_, value)| !value.is_finite())
        {
            return Err(InferenceError::NonFiniteFeature(column));
        }

        let scaled = self.bundle.scaler.apply(ordered.values());
        let scaled_vector = ordered.with_values(scaled.values).ok_or_else(|| {
            InferenceError::TransformFailed("scaler changed the number of features".to_string())
        })?;
        let regression_vector = scaled_vector
            .project(self.bundle.regression_layout)
            .map_err(InferenceError::MissingColumn)?;

        let classifier = &self.bundle.classifier;
        let (label, class_probabilities) = classifier.predict_with_probability(scaled_vector.values())?;
        let predicted_emi = self.bundle.regressor.predict(regression_vector.values())?;

        let decision = Decision::from_label(label);
        let probability = match decision {
            Decision::Approved => class_probabilities[1],
            Decision::Rejected => class_probabilities[0],
        };

        Ok(Outcome {
            prediction: Prediction {
                decision,
                probability,
                class_probabilities,
                predicted_emi,
            },
            unscaled: scaled.degraded,
        })
    }
}

/// A prediction plus how it was reached
struct Outcome {
    prediction: Prediction,
    unscaled: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Classifier, LinearRegressor, LogisticClassifier, Regressor};
    use crate::scaler::Scaler;
    use feature_engine::{FeatureColumn, CLASSIFICATION_COLUMNS};

    fn weights(layout: FeatureLayout, terms: &[(FeatureColumn, f64)]) -> Vec<f64> {
        layout
            .columns()
            .iter()
            .map(|column| {
                terms
                    .iter()
                    .find(|(c, _)| c == column)
                    .map_or(0.0, |(_, w)| *w)
            })
            .collect()
    }

    fn identity_scaler() -> Scaler {
        Scaler::MeanStd {
            mean: vec![0.0; CLASSIFICATION_COLUMNS.len()],
            std: vec![1.0; CLASSIFICATION_COLUMNS.len()],
        }
    }

    /// Approves when the credit score is above 700; predicts 40% of savings capacity
    fn engine_with(scaler: Scaler) -> InferenceEngine {
        let classifier = LogisticClassifier::new(
            weights(FeatureLayout::Classification, &[(FeatureColumn::CreditScore, 1.0)]),
            -700.0,
        );
        let regressor = LinearRegressor::new(
            weights(FeatureLayout::Regression, &[(FeatureColumn::SavingsCapacity, 0.4)]),
            0.0,
        );
        InferenceEngine::new(ModelBundle::new(
            Box::new(classifier),
            Box::new(regressor),
            scaler,
            FeatureLayout::Regression,
        ))
    }

    fn applicant(credit_score: f64) -> RawInput {
        RawInput {
            monthly_salary: 50_000.0,
            monthly_rent: 10_000.0,
            credit_score,
            ..Default::default()
        }
    }

    #[test]
    fn test_approved_reports_approval_probability() {
        let engine = engine_with(identity_scaler());
        let assessment = engine.assess(&applicant(750.0)).unwrap();
        let prediction = &assessment.result.prediction;

        assert_eq!(prediction.decision, Decision::Approved);
        assert_eq!(prediction.probability, prediction.class_probabilities[1]);
        assert!(prediction.probability > 0.99);
        assert_eq!(prediction.predicted_emi, 9_400.0);
        assert!(!assessment.result.is_degraded());
        assert_eq!(assessment.record.max_monthly_emi, 9_400.0);
    }

    #[test]
    fn test_rejected_reports_rejection_probability() {
        let engine = engine_with(identity_scaler());
        let result = engine.assess(&applicant(600.0)).unwrap().result;

        assert_eq!(result.prediction.decision, Decision::Rejected);
        assert_eq!(result.prediction.probability, result.prediction.class_probabilities[0]);
        assert!(result.prediction.probability > 0.99);
    }

    #[test]
    fn test_passthrough_is_reported() {
        let engine = engine_with(Scaler::Passthrough {
            reason: "unknown scaler type: number".to_string(),
        });
        let result = engine.assess(&applicant(750.0)).unwrap().result;

        assert_eq!(result.prediction.decision, Decision::Approved);
        assert_eq!(
            result.warnings,
            vec![PredictionWarning::UnscaledFeatures {
                reason: "unknown scaler type: number".to_string()
            }]
        );
    }

    #[test]
    fn test_scaler_width_mismatch_degrades() {
        let engine = engine_with(Scaler::MeanStd {
            mean: vec![0.0; 42],
            std: vec![1.0; 42],
        });
        let result = engine.assess(&applicant(750.0)).unwrap().result;
        assert!(result.is_degraded());
        assert_eq!(result.prediction.predicted_emi, 9_400.0);
    }

    #[test]
    fn test_vector_order_is_restored_by_name() {
        let engine = engine_with(identity_scaler());
        let record = engineer_features(&applicant(750.0));
        let ordered = FeatureVector::extract(&record, FeatureLayout::Classification);

        let mut columns = ordered.columns().to_vec();
        let mut values = ordered.values().to_vec();
        columns.reverse();
        values.reverse();
        let shuffled = FeatureVector::from_parts(columns, values).unwrap();

        assert_eq!(
            engine.predict(&shuffled).unwrap().prediction,
            engine.predict(&ordered).unwrap().prediction
        );
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let engine = engine_with(identity_scaler());
        let record = engineer_features(&applicant(750.0));
        let narrow = FeatureVector::extract(&record, FeatureLayout::Regression);

        assert!(matches!(
            engine.predict(&narrow),
            Err(InferenceError::MissingColumn(FeatureColumn::MaxMonthlyEmi))
        ));
    }

    #[test]
    fn test_regressor_on_classification_layout() {
        let classifier = LogisticClassifier::new(vec![0.0; 43], 1.0);
        let regressor = LinearRegressor::new(
            weights(FeatureLayout::Classification, &[(FeatureColumn::MaxMonthlyEmi, 1.0)]),
            0.0,
        );
        let engine = InferenceEngine::new(ModelBundle::new(
            Box::new(classifier),
            Box::new(regressor),
            identity_scaler(),
            FeatureLayout::Classification,
        ));

        let result = engine.assess(&applicant(750.0)).unwrap().result;
        assert_eq!(result.prediction.predicted_emi, 9_400.0);
    }

    struct BrokenRegressor;

    impl Regressor for BrokenRegressor {
        fn predict(&self, _features: &[f64]) -> Result<f64, InferenceError> {
            Err(InferenceError::InferenceFailed("backend crashed".to_string()))
        }

        fn kind(&self) -> &'static str {
            "broken"
        }
    }

    #[test]
    fn test_model_failure_has_no_partial_result() {
        let classifier: Box<dyn Classifier> = Box::new(LogisticClassifier::new(vec![0.0; 43], 1.0));
        let engine = InferenceEngine::new(ModelBundle::new(
            classifier,
            Box::new(BrokenRegressor),
            identity_scaler(),
            FeatureLayout::Regression,
        ));
        assert!(matches!(
            engine.assess(&applicant(750.0)),
            Err(InferenceError::InferenceFailed(_))
        ));
    }

    #[test]
    fn test_overflowing_salary_is_an_error() {
        let engine = engine_with(identity_scaler());
        let raw = RawInput {
            monthly_salary: 1e308,
            ..applicant(750.0)
        };
        assert!(matches!(
            engine.assess(&raw),
            Err(InferenceError::NonFiniteFeature(FeatureColumn::RequestedAmount))
        ));
    }

    /// Only answers through the combined call
    struct SingleShotClassifier;

    impl Classifier for SingleShotClassifier {
        fn predict(&self, _features: &[f64]) -> Result<i64, InferenceError> {
            Err(InferenceError::InferenceFailed("label evaluated separately".to_string()))
        }

        fn predict_probability(&self, _features: &[f64]) -> Result<[f64; 2], InferenceError> {
            Err(InferenceError::InferenceFailed("probabilities evaluated separately".to_string()))
        }

        fn predict_with_probability(&self, _features: &[f64]) -> Result<(i64, [f64; 2]), InferenceError> {
            Ok((1, [0.2, 0.8]))
        }

        fn kind(&self) -> &'static str {
            "single_shot"
        }
    }

    #[test]
    fn test_classifier_evaluated_once_per_prediction() {
        let engine = InferenceEngine::new(ModelBundle::new(
            Box::new(SingleShotClassifier),
            Box::new(LinearRegressor::new(vec![0.0; 42], 0.0)),
            identity_scaler(),
            FeatureLayout::Regression,
        ));
        let result = engine.assess(&applicant(750.0)).unwrap().result;
        assert_eq!(result.prediction.decision, Decision::Approved);
        assert_eq!(result.prediction.probability, 0.8);
    }

    #[test]
    fn test_non_binary_label_rejects() {
        assert_eq!(Decision::from_label(1), Decision::Approved);
        assert_eq!(Decision::from_label(0), Decision::Rejected);
        assert_eq!(Decision::from_label(2), Decision::Rejected);
        assert_eq!(Decision::Rejected.recommendations().len(), 4);
    }
}
