use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use rand::{rngs::StdRng, SeedableRng};
use tracing::debug;

use crate::{
    app::AppState,
    error::AppError,
    libraries::spread_forecast::{forecast, forecast_spread, validate_horizon, ForecastResult},
    models::{InfectionPoint, InfectionRecord, PredictRequest},
    services::InfectionRepository,
};

/// Forecast the spread of every stored infection point.
///
/// A request without a JSON body forecasts the configured default horizon.
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<ForecastResult>, AppError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => PredictRequest::default(),
        Err(JsonRejection::JsonDataError(e)) => return Err(AppError::InvalidInput(e.body_text())),
        Err(rejection) => {
            return Err(AppError::Rejected(rejection.status(), rejection.body_text()))
        }
    };

    let days = validate_horizon(
        request
            .days
            .unwrap_or_else(|| i64::from(state.config.default_forecast_days)),
        state.config.max_forecast_days,
    )?;

    let current: Vec<InfectionPoint> = state
        .with_store(|store| store.list_all_points())
        .await?
        .iter()
        .map(InfectionRecord::point)
        .collect();

    let result = match request.seed {
        Some(seed) => forecast(&current, days, &mut StdRng::seed_from_u64(seed)),
        None => forecast_spread(&current, days),
    };

    debug!(
        "Forecast over {} days: {} points, {} new, {} timeframes",
        days,
        current.len(),
        result.new_point_count(),
        result.timeframes.len()
    );

    Ok(Json(result))
}
