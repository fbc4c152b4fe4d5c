use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{info, warn};

use crate::{
    app::AppState,
    error::AppError,
    models::{InfectionPoint, SampleDataRequest, StatusResponse},
    services::{sample_data::debug_points, InfectionRepository},
};

/// Add random infection points around a center. Debug mode only.
pub async fn add_sample_data(
    State(state): State<AppState>,
    payload: Result<Json<SampleDataRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    if !state.config.debug {
        warn!("Rejected sample data request outside debug mode");
        return Err(AppError::DebugOnly);
    }

    let request = match payload {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => SampleDataRequest::default(),
        Err(JsonRejection::JsonDataError(e)) => return Err(AppError::InvalidInput(e.body_text())),
        Err(rejection) => {
            return Err(AppError::Rejected(rejection.status(), rejection.body_text()))
        }
    };

    if !InfectionPoint::new(request.lat, request.lng, 0.0).has_valid_coordinates() {
        return Err(AppError::InvalidInput(format!(
            "Invalid center coordinates ({}, {})",
            request.lat, request.lng
        )));
    }

    let points = debug_points(&mut rand::thread_rng(), request.lat, request.lng);
    let inserted = state
        .with_store(move |store| store.add_points(&points))
        .await?;
    info!(
        "Added {} sample infection points around ({}, {})",
        inserted, request.lat, request.lng
    );

    Ok(Json(StatusResponse::new("Sample data added")))
}
