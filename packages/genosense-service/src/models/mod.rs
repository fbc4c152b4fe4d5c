pub mod image;
pub mod infection;
pub mod prediction_model;
pub mod requests;

// Re-export commonly used types
pub use image::ImageRecord;
pub use infection::{InfectionPoint, InfectionRecord, NewInfection, TrendBucket};
pub use prediction_model::{ModelInfo, PredictionModel};
pub use requests::{Flash, FlashQuery, PredictRequest, SampleDataRequest, StatusResponse};
