use crate::classification::{Classification, Label};
use serde::{Deserialize, Serialize};

pub const HOME_MESSAGE: &str = "MLOps Cat vs Dog API is running!";
pub const HEALTHY: &str = "healthy";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct HomeResponse {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PredictionResponse {
    pub label: Label,
    pub confidence: f32,
    pub latency_seconds: f64,
}

impl PredictionResponse {
    pub fn new(classification: Classification, latency_seconds: f64) -> Self {
        Self {
            label: classification.label,
            confidence: classification.confidence,
            latency_seconds,
        }
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
}
