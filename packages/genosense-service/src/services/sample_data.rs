use chrono::{Duration, Utc};
use rand::Rng;

use crate::models::{InfectionPoint, NewInfection, PredictionModel};

/// Points added by the debug sample-data endpoint
pub const DEBUG_SAMPLE_COUNT: usize = 20;

/// Points seeded by `setup_db --with-sample-data`
pub const SEED_SAMPLE_COUNT: usize = 25;

/// Kuala Lumpur, in the middle of the peninsular plantation area
pub const SEED_CENTER: (f64, f64) = (3.140853, 101.693207);

/// Random points within ~5km of a center, all dated now
pub fn debug_points<R: Rng + ?Sized>(rng: &mut R, center_lat: f64, center_lng: f64) -> Vec<NewInfection> {
    (0..DEBUG_SAMPLE_COUNT)
        .map(|_| {
            let lat_offset = (rng.gen::<f64>() - 0.5) * 0.1;
            let lng_offset = (rng.gen::<f64>() - 0.5) * 0.1;
            NewInfection::now(InfectionPoint::new(
                center_lat + lat_offset,
                center_lng + lng_offset,
                rng.gen::<f64>(),
            ))
        })
        .collect()
}

/// Development data set: points within ~50km of `SEED_CENTER`, spread over
/// the last 30 days, levels between 0.1 and 0.9.
pub fn seed_points<R: Rng + ?Sized>(rng: &mut R) -> Vec<NewInfection> {
    let (base_lat, base_lng) = SEED_CENTER;
    let now = Utc::now();

    (0..SEED_SAMPLE_COUNT)
        .map(|_| {
            let lat_offset = (rng.gen::<f64>() - 0.5) * 0.5;
            let lng_offset = (rng.gen::<f64>() - 0.5) * 0.5;
            let days_ago = rng.gen_range(0..=30);
            let level = (rng.gen_range(0.1..=0.9_f64) * 100.0).round() / 100.0;

            NewInfection {
                point: InfectionPoint::new(base_lat + lat_offset, base_lng + lng_offset, level),
                recorded_at: now - Duration::days(days_ago),
                source_image_id: None,
            }
        })
        .collect()
}

pub fn seed_models() -> Vec<PredictionModel> {
    vec![
        PredictionModel::new("UNet Segmentation", "UNet", 0.89),
        PredictionModel::new("ANN Classifier", "ANN", 0.92),
        PredictionModel::new("Cellular Automata", "CA", 0.85),
    ]
}
