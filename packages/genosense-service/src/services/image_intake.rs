use rand::Rng;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::models::{InfectionPoint, NewInfection};

/// Half-width in degrees of the square around the base point (~2km)
const DETECTION_SPREAD_DEGREES: f64 = 0.04;

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("cannot read image {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image {} is empty", .0.display())]
    Empty(PathBuf),
}

/// What processing an uploaded image produced
#[derive(Debug, Clone)]
pub struct IntakeReport {
    pub points: Vec<NewInfection>,
    pub result_path: PathBuf,
}

/// Stand-in for the segmentation model.
///
/// It does not look at pixels: after a simulated processing delay it reports
/// 3 to 7 infection points scattered around a random base point in the
/// Indonesian/Malaysian plantation belt.
#[derive(Debug, Clone)]
pub struct ImageIntake {
    delay: Duration,
}

impl ImageIntake {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn process(&self, path: &Path, image_id: i64) -> Result<IntakeReport, IntakeError> {
        info!("Processing image: {}", path.display());

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|source| IntakeError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;
        if metadata.len() == 0 {
            return Err(IntakeError::Empty(path.to_path_buf()));
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let points = detect_infections(&mut rand::thread_rng(), image_id);
        info!(
            "Added {} simulated infection points from image {}",
            points.len(),
            image_id
        );

        Ok(IntakeReport {
            points,
            result_path: path.to_path_buf(),
        })
    }
}

fn detect_infections<R: Rng + ?Sized>(rng: &mut R, image_id: i64) -> Vec<NewInfection> {
    let count = rng.gen_range(3..8);
    let base_lat = rng.gen_range(-3.0..3.0);
    let base_lng = rng.gen_range(100.0..115.0);

    (0..count)
        .map(|_| {
            let lat_offset = (rng.gen::<f64>() - 0.5) * DETECTION_SPREAD_DEGREES;
            let lng_offset = (rng.gen::<f64>() - 0.5) * DETECTION_SPREAD_DEGREES;
            let level = rng.gen::<f64>();
            NewInfection::from_image(
                InfectionPoint::new(base_lat + lat_offset, base_lng + lng_offset, level),
                image_id,
            )
        })
        .collect()
}
