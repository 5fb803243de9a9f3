use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pricing::engine::floor_and_round;
use crate::pricing::{Estimate, EstimateSource, FactorModel};
use crate::recommend::CandidateListing;
use crate::service::{OptionsSource, Prediction, PredictionService, RecommendationService};
use crate::vehicle::{OptionsCatalog, VehicleSpec};

/// What to do when the prediction service can't produce a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Compute the estimate locally instead.
    #[default]
    Local,
    /// Report the failure to the caller.
    Fail,
}

/// Wrap a remote prediction as an estimate. Confidence passes through as given.
pub fn estimate_from_prediction(
    spec: &VehicleSpec,
    prediction: Prediction,
    created_at: DateTime<Utc>,
) -> Estimate {
    Estimate {
        predicted_price: floor_and_round(prediction.predicted_price),
        confidence: prediction.confidence,
        factors: prediction.factors,
        raw_price: None,
        source: EstimateSource::Service,
        source_spec: spec.sanitized(),
        created_at,
    }
}

/// Estimate a spec, preferring the remote service when one is configured.
///
/// With [`FallbackPolicy::Local`] a service failure degrades to the local
/// model. With [`FallbackPolicy::Fail`] the failure is returned; no price is
/// made up.
pub async fn fetch_estimate<S: PredictionService>(
    service: Option<&S>,
    model: &FactorModel,
    spec: &VehicleSpec,
    policy: FallbackPolicy,
) -> Result<Estimate> {
    let Some(service) = service else {
        return Ok(model.estimate(spec));
    };

    match service.predict(spec).await {
        Ok(prediction) => Ok(estimate_from_prediction(spec, prediction, Utc::now())),
        Err(e) => match policy {
            FallbackPolicy::Local => {
                log::warn!("Prediction service failed, using local model: {}", e);
                Ok(model.estimate(spec))
            }
            FallbackPolicy::Fail => Err(e),
        },
    }
}

/// Fetch comparable listings for an estimate. Any failure yields an empty set.
pub async fn fetch_recommendations<S: RecommendationService>(
    service: Option<&S>,
    estimate: &Estimate,
) -> Vec<CandidateListing> {
    let Some(service) = service else {
        return Vec::new();
    };

    match service
        .recommend(&estimate.source_spec, estimate.predicted_price)
        .await
    {
        Ok(items) => {
            log::debug!("Received {} recommendation candidates", items.len());
            items
        }
        Err(e) => {
            log::warn!("Recommendations unavailable: {}", e);
            Vec::new()
        }
    }
}

/// Fetch the options catalog, falling back to the built-in one when the
/// service is absent, failing, or returns an incomplete catalog.
pub async fn fetch_options<S: OptionsSource>(service: Option<&S>) -> OptionsCatalog {
    let Some(service) = service else {
        return OptionsCatalog::fallback();
    };

    match service.options().await {
        Ok(catalog) if catalog.is_complete() => catalog,
        Ok(_) => {
            log::warn!("Options catalog from service is incomplete, using built-in catalog");
            OptionsCatalog::fallback()
        }
        Err(e) => {
            log::warn!("Options catalog unavailable, using built-in catalog: {}", e);
            OptionsCatalog::fallback()
        }
    }
}
