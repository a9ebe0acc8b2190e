//! Prediction Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use feature_engine::EngineeredRecord;
use inference_engine::Decision;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::ApiError;
use crate::AppState;

/// Headline figures shown next to the decision
#[derive(Debug, Serialize)]
pub struct FinancialSummary {
    pub monthly_salary: f64,
    pub total_monthly_expenses: f64,
    pub savings_capacity: f64,
    pub max_monthly_emi: f64,
    pub credit_score: f64,
    pub bank_balance: f64,
}

#[derive(Debug, Serialize)]
pub struct FinancialRatios {
    pub debt_to_income: f64,
    pub housing_burden: f64,
    pub expense_to_income: f64,
    pub affordability: f64,
}

/// Response for the predict endpoint
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub decision: Decision,
    /// Probability of the reported decision
    pub probability: f64,
    /// Estimated monthly installment
    pub predicted_emi: f64,
    pub warnings: Vec<String>,
    pub summary: FinancialSummary,
    pub ratios: FinancialRatios,
    pub recommendations: &'static [&'static str],
    pub record: EngineeredRecord,
    pub latency_ms: u64,
}

impl FinancialSummary {
    fn from_record(record: &EngineeredRecord) -> Self {
        Self {
            monthly_salary: record.raw.monthly_salary,
            total_monthly_expenses: record.total_monthly_expenses,
            savings_capacity: record.savings_capacity,
            max_monthly_emi: record.max_monthly_emi,
            credit_score: record.raw.credit_score,
            bank_balance: record.raw.bank_balance,
        }
    }
}

impl FinancialRatios {
    fn from_record(record: &EngineeredRecord) -> Self {
        Self {
            debt_to_income: record.debt_to_income_ratio,
            housing_burden: record.housing_burden_ratio,
            expense_to_income: record.expance_to_income_ratio,
            affordability: record.affordability_ratio,
        }
    }
}

/// Validate, engineer and predict in one request
pub async fn predict(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(body) = body?;
    let validated = state.validator.validate_value(&body)?;
    let assessment = state.engine.assess(&validated.input)?;

    let result = assessment.result;
    let record = assessment.record;
    let warnings = validated
        .warnings
        .iter()
        .map(ToString::to_string)
        .chain(result.warnings.iter().map(ToString::to_string))
        .collect();

    Ok(Json(PredictionResponse {
        decision: result.prediction.decision,
        probability: result.prediction.probability,
        predicted_emi: result.prediction.predicted_emi,
        warnings,
        summary: FinancialSummary::from_record(&record),
        ratios: FinancialRatios::from_record(&record),
        recommendations: result.prediction.decision.recommendations(),
        record,
        latency_ms: result.latency_ms,
    }))
}
