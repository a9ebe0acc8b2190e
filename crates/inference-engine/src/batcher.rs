//! Batch Prediction

use feature_engine::FeatureVector;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::engine::{InferenceEngine, InferenceResult};
use crate::InferenceError;

/// Predict every vector in a keyed batch.
///
/// The batch fails as a whole on the first error; no partial results are returned.
pub fn predict_batch<K>(
    engine: &InferenceEngine,
    batch: &BTreeMap<K, FeatureVector>,
) -> Result<BTreeMap<K, InferenceResult>, InferenceError>
where
    K: Ord + Clone + std::fmt::Debug,
{
    info!("Processing batch of {} feature vectors", batch.len());

    let results = batch
        .iter()
        .map(|(id, features)| {
            let result = engine.predict(features).map_err(|e| {
                debug!("Batch item {:?} failed: {}", id, e);
                e
            })?;
            Ok((id.clone(), result))
        })
        .collect::<Result<BTreeMap<_, _>, InferenceError>>()?;

    debug!(
        "Batch complete: {} predictions, {} degraded",
        results.len(),
        results.values().filter(|r| r.is_degraded()).count()
    );
    Ok(results)
}

impl InferenceEngine {
    /// See [`predict_batch`]
    pub fn predict_batch<K>(
        &self,
        batch: &BTreeMap<K, FeatureVector>,
    ) -> Result<BTreeMap<K, InferenceResult>, InferenceError>
    where
        K: Ord + Clone + std::fmt::Debug,
    {
        predict_batch(self, batch)
    }
}
