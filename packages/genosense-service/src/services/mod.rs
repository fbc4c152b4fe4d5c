pub mod image_intake;
pub mod model_catalog;
pub mod sample_data;
pub mod store;

pub use image_intake::{ImageIntake, IntakeError, IntakeReport};
pub use store::{InfectionRepository, SqliteStore, StoreError};
