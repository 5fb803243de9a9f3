use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pricing::{Confidence, FactorBreakdown};
use crate::recommend::CandidateListing;
use crate::vehicle::VehicleSpec;

/// A resolved prediction from a remote model.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub predicted_price: f64,
    pub confidence: Confidence,
    pub factors: FactorBreakdown,
}

/// Body of `POST /api/predict`.
///
/// `{success: true, predicted_price, confidence, factors}` or
/// `{success: false, error}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub predicted_price: Option<f64>,
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub factors: Option<FactorBreakdown>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PredictResponse {
    pub fn into_prediction(self) -> Result<Prediction> {
        if !self.success {
            return Err(Error::Rejected(
                self.error.unwrap_or_else(|| "no reason given".to_string()),
            ));
        }

        let predicted_price = self
            .predicted_price
            .filter(|p| p.is_finite())
            .ok_or_else(|| Error::MalformedResponse("missing predicted_price".to_string()))?;
        let confidence = self
            .confidence
            .ok_or_else(|| Error::MalformedResponse("missing confidence".to_string()))?
            .parse::<Confidence>()
            .map_err(Error::MalformedResponse)?;
        let factors = self
            .factors
            .ok_or_else(|| Error::MalformedResponse("missing factors".to_string()))?;

        Ok(Prediction {
            predicted_price,
            confidence,
            factors,
        })
    }
}

/// Body of `POST /api/recommendations`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest<'a> {
    #[serde(flatten)]
    pub spec: &'a VehicleSpec,
    pub predicted_price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub items: Vec<CandidateListing>,
    #[serde(default)]
    pub error: Option<String>,
}

impl RecommendResponse {
    pub fn into_items(self) -> Result<Vec<CandidateListing>> {
        if self.success {
            Ok(self.items)
        } else {
            Err(Error::Rejected(
                self.error.unwrap_or_else(|| "no reason given".to_string()),
            ))
        }
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_prediction() {
        let json = r#"{
            "predicted_price": 41230,
            "confidence": "Medium",
            "factors": {"year": 10000, "mileage": -2500, "age": -6000, "power": 6300, "fuel": 1750, "brand": 7500},
            "success": true
        }"#;
        let response: PredictResponse = serde_json::from_str(json).unwrap();
        let prediction = response.into_prediction().unwrap();
        assert_eq!(prediction.predicted_price, 41230.0);
        assert_eq!(prediction.confidence, Confidence::Medium);
        assert_eq!(prediction.factors.other.get("brand"), Some(&7500.0));
    }

    #[test]
    fn test_rejected_prediction() {
        let json = r#"{"success": false, "error": "could not convert string to float"}"#;
        let response: PredictResponse = serde_json::from_str(json).unwrap();
        match response.into_prediction() {
            Err(Error::Rejected(msg)) => assert!(msg.contains("float")),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_success_without_price_is_malformed() {
        let json = r#"{"success": true, "confidence": "High", "factors": {}}"#;
        let response: PredictResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            response.into_prediction(),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_confidence_label_is_normalized() {
        let json = r#"{"success": true, "predicted_price": 1, "confidence": "high", "factors": {}}"#;
        let response: PredictResponse = serde_json::from_str(json).unwrap();
        let prediction = response.into_prediction().unwrap();
        assert_eq!(prediction.confidence, Confidence::High);
        assert_eq!(prediction.confidence.to_string(), "High");
    }

    #[test]
    fn test_unknown_confidence_is_malformed() {
        let json = r#"{"success": true, "predicted_price": 1, "confidence": "Certain", "factors": {}}"#;
        let response: PredictResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            response.into_prediction(),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_recommend_request_is_flat() {
        let spec = VehicleSpec::default();
        let request = RecommendRequest {
            spec: &spec,
            predicted_price: 30_000.0,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["predictedPrice"], 30_000.0);
        assert_eq!(json["manufacturingYear"], 2020.0);
        assert_eq!(json["brand"], "audi");
    }

    #[test]
    fn test_recommend_response() {
        let json = r#"{"success": true, "items": [{"id": 1, "price_in_euro": 1000}]}"#;
        let response: RecommendResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_items().unwrap().len(), 1);

        let failed: RecommendResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(failed.into_items().is_err());
    }

    #[test]
    fn test_health_status() {
        let json = r#"{"status": "healthy", "message": "Car Price Prediction API is running"}"#;
        let health: HealthStatus = serde_json::from_str(json).unwrap();
        assert!(health.is_healthy());
    }
}
