use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, Retry};

use super::types::{
    HealthStatus, PredictResponse, Prediction, RecommendRequest, RecommendResponse,
};
use crate::error::{Error, Result};
use crate::recommend::CandidateListing;
use crate::vehicle::{OptionsCatalog, VehicleSpec};

/// Remote model producing a price for a spec.
pub trait PredictionService {
    fn predict(&self, spec: &VehicleSpec) -> impl Future<Output = Result<Prediction>> + Send;
}

/// Remote source of comparable listings for an estimate.
pub trait RecommendationService {
    fn recommend(
        &self,
        spec: &VehicleSpec,
        predicted_price: f64,
    ) -> impl Future<Output = Result<Vec<CandidateListing>>> + Send;
}

/// Remote source of valid categorical values.
pub trait OptionsSource {
    fn options(&self) -> impl Future<Output = Result<OptionsCatalog>> + Send;
}

/// HTTP client for the prediction backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    retries: usize,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration, retries: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("car-value/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retries,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn retry_strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(5))
            .take(self.retries)
    }

    /// Send a request, retrying connection-level failures with backoff.
    async fn send<F>(&self, build: F) -> Result<reqwest::Response>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let build = &build;
        let base_url = self.base_url.as_str();
        let response = Retry::spawn(self.retry_strategy(), move || {
            let request = build();
            async move {
                request.send().await.inspect_err(|e| {
                    log::debug!("Request to {} failed: {}", base_url, e);
                })
            }
        })
        .await?;
        Ok(response)
    }

    /// Decode a JSON body. Non-2xx responses are still decoded, because the
    /// backend reports failures as `{success: false, error}` with status 400.
    async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R> {
        let status = response.status();
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            if status.is_success() {
                Error::MalformedResponse(e.to_string())
            } else {
                Error::Rejected(format!("HTTP {}", status))
            }
        })
    }

    async fn post_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R> {
        let url = self.url(path);
        log::debug!("POST {}", url);
        let response = self.send(|| self.client.post(&url).json(body)).await?;
        Self::decode(response).await
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let url = self.url(path);
        log::debug!("GET {}", url);
        let response = self.send(|| self.client.get(&url)).await?;
        Self::decode(response).await
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        self.get_json("/api/health").await
    }
}

impl PredictionService for HttpBackend {
    async fn predict(&self, spec: &VehicleSpec) -> Result<Prediction> {
        let response: PredictResponse = self.post_json("/api/predict", spec).await?;
        response.into_prediction()
    }
}

impl RecommendationService for HttpBackend {
    async fn recommend(
        &self,
        spec: &VehicleSpec,
        predicted_price: f64,
    ) -> Result<Vec<CandidateListing>> {
        let request = RecommendRequest {
            spec,
            predicted_price,
        };
        let response: RecommendResponse = self.post_json("/api/recommendations", &request).await?;
        response.into_items()
    }
}

impl OptionsSource for HttpBackend {
    async fn options(&self) -> Result<OptionsCatalog> {
        self.get_json("/api/options").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:5000/", Duration::from_secs(1), 0).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:5000");
        assert_eq!(backend.url("/api/predict"), "http://localhost:5000/api/predict");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Port 9 (discard) is closed on test machines; no retries to keep it fast.
        let backend = HttpBackend::new("http://127.0.0.1:9", Duration::from_millis(500), 0).unwrap();
        let err = backend.predict(&VehicleSpec::default()).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(err.is_transport());
    }
}
