use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Horizon in days. Signed so that negative values reach validation
    /// instead of failing deserialization.
    #[serde(default)]
    pub days: Option<i64>,
    /// Fixes the random source for a reproducible forecast
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleDataRequest {
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}

/// One-shot message shown after a redirect, carried as `?flash=<kind>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flash {
    NoFilePart,
    NoSelectedFile,
    DisallowedType,
    Uploaded,
}

impl Flash {
    pub fn message(&self) -> &'static str {
        match self {
            Flash::NoFilePart => "No file part",
            Flash::NoSelectedFile => "No selected file",
            Flash::DisallowedType => "File type not allowed (png, jpg, jpeg, tif, tiff)",
            Flash::Uploaded => "File successfully uploaded and processed",
        }
    }

    pub fn query_value(&self) -> &'static str {
        match self {
            Flash::NoFilePart => "no_file_part",
            Flash::NoSelectedFile => "no_selected_file",
            Flash::DisallowedType => "disallowed_type",
            Flash::Uploaded => "uploaded",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlashQuery {
    pub flash: Option<Flash>,
}
