pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod libraries;
pub mod models;
pub mod services;

pub use app::{router, AppState};
pub use config::Config;
pub use error::AppError;
