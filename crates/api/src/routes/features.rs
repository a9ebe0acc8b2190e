//! Feature Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use feature_engine::{engineer_features, EngineeredRecord, FeatureLayout, FeatureVector};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::ApiError;
use crate::AppState;

/// One column of the ordered model input
#[derive(Debug, Serialize)]
pub struct NamedFeature {
    pub name: &'static str,
    pub value: f64,
}

/// Response for the features endpoint
#[derive(Debug, Serialize)]
pub struct FeaturesResponse {
    pub record: EngineeredRecord,
    /// Classification layout, in model order
    pub features: Vec<NamedFeature>,
    pub warnings: Vec<String>,
}

/// Validate the submitted attributes and return every derived column
pub async fn engineer(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<FeaturesResponse>, ApiError> {
    let Json(body) = body?;
    let validated = state.validator.validate_value(&body)?;
    let record = engineer_features(&validated.input);

    let vector = FeatureVector::extract(&record, FeatureLayout::Classification);
    let features = vector
        .columns()
        .iter()
        .zip(vector.values())
        .map(|(column, &value)| NamedFeature {
            name: column.name(),
            value,
        })
        .collect();

    Ok(Json(FeaturesResponse {
        record,
        features,
        warnings: validated.warnings.iter().map(ToString::to_string).collect(),
    }))
}
