pub mod client;
pub mod types;

pub use client::{HttpBackend, OptionsSource, PredictionService, RecommendationService};
pub use types::{HealthStatus, Prediction};
