use axum::{extract::State, Json};
use tracing::debug;

use crate::{
    app::AppState,
    error::AppError,
    models::{InfectionRecord, ModelInfo, TrendBucket},
    services::{model_catalog::model_catalog, InfectionRepository},
};

/// Every stored infection point, for the map layer
pub async fn infection_data(
    State(state): State<AppState>,
) -> Result<Json<Vec<InfectionRecord>>, AppError> {
    let records = state.with_store(|store| store.list_all_points()).await?;
    debug!("Serving {} infection points", records.len());
    Ok(Json(records))
}

/// Count and average severity per day, for the trend chart
pub async fn trend_data(State(state): State<AppState>) -> Result<Json<Vec<TrendBucket>>, AppError> {
    Ok(Json(state.with_store(|store| store.trend_by_date()).await?))
}

pub async fn model_info() -> Json<Vec<ModelInfo>> {
    Json(model_catalog())
}
