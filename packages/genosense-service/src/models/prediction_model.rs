use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored metadata about a prediction model. Informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionModel {
    pub name: String,
    pub model_type: String, // ANN, UNet, CA
    pub created_date: DateTime<Utc>,
    pub accuracy: Option<f64>,
    pub active: bool,
}

impl PredictionModel {
    pub fn new(name: &str, model_type: &str, accuracy: f64) -> Self {
        Self {
            name: name.to_string(),
            model_type: model_type.to_string(),
            created_date: Utc::now(),
            accuracy: Some(accuracy),
            active: true,
        }
    }
}

/// Entry of the `/api/model_info` catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub model_type: String,
    pub description: String,
    pub accuracy: f64,
    pub last_updated: String,
    pub active: bool,
}
