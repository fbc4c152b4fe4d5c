use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    handlers::{
        data::{infection_data, model_info, trend_data},
        health,
        pages::{about, index, upload_form},
        predict::predict,
        sample_data::add_sample_data,
        upload::{upload, uploaded_file},
    },
    error::AppError,
    services::{ImageIntake, SqliteStore, StoreError},
};

/// Everything a request handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<SqliteStore>,
    pub intake: Arc<ImageIntake>,
}

impl AppState {
    pub fn new(config: Config, store: SqliteStore) -> Self {
        let intake = ImageIntake::new(config.intake_delay());
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            intake: Arc::new(intake),
        }
    }

    /// Run a store operation on the blocking pool, off the async workers
    pub async fn with_store<F, T>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&SqliteStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || op(&store)).await?;
        Ok(result?)
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_content_length;

    Router::new()
        .route("/", get(index))
        .route("/about", get(about))
        .route("/upload", get(upload_form).post(upload))
        .route("/uploads/:filename", get(uploaded_file))
        .route("/health", get(health))
        .route("/api/health", get(health))
        .route("/api/infection_data", get(infection_data))
        .route("/api/trend_data", get(trend_data))
        .route("/api/model_info", get(model_info))
        .route("/api/predict", post(predict))
        .route("/api/sample_data", post(add_sample_data))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
