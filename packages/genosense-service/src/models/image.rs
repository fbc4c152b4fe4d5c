use chrono::{DateTime, Utc};
use serde::Serialize;

/// An uploaded plantation image and its processing state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRecord {
    pub id: i64,
    pub filename: String,
    pub upload_date: DateTime<Utc>,
    pub processed: bool,
    pub result_path: Option<String>,
}
