use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geotagged infection severity observation.
///
/// Serialized as `{lat, lng, level}`, the shape the map front-end reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InfectionPoint {
    #[serde(rename = "lat", alias = "latitude")]
    pub latitude: f64,
    #[serde(rename = "lng", alias = "longitude")]
    pub longitude: f64,
    /// Severity in `[0, 1]`
    pub level: f64,
}

impl InfectionPoint {
    pub fn new(latitude: f64, longitude: f64, level: f64) -> Self {
        Self {
            latitude,
            longitude,
            level,
        }
    }

    /// Validate that coordinates are within WGS84 ranges
    pub fn has_valid_coordinates(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A stored infection row, as returned by `/api/infection_data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfectionRecord {
    pub id: i64,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
    pub level: f64,
    #[serde(rename = "date", serialize_with = "serialize_day")]
    pub recorded_at: DateTime<Utc>,
    #[serde(skip)]
    pub source_image_id: Option<i64>,
}

impl InfectionRecord {
    pub fn point(&self) -> InfectionPoint {
        InfectionPoint::new(self.latitude, self.longitude, self.level)
    }

    /// Calendar day of the record, `YYYY-MM-DD`
    pub fn day(&self) -> String {
        self.recorded_at.format("%Y-%m-%d").to_string()
    }
}

fn serialize_day<S>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&at.format("%Y-%m-%d"))
}

/// An infection observation waiting to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInfection {
    pub point: InfectionPoint,
    pub recorded_at: DateTime<Utc>,
    pub source_image_id: Option<i64>,
}

impl NewInfection {
    pub fn now(point: InfectionPoint) -> Self {
        Self {
            point,
            recorded_at: Utc::now(),
            source_image_id: None,
        }
    }

    pub fn from_image(point: InfectionPoint, image_id: i64) -> Self {
        Self {
            point,
            recorded_at: Utc::now(),
            source_image_id: Some(image_id),
        }
    }
}

/// Per-day summary used by the trend chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendBucket {
    pub date: String,
    pub count: u32,
    pub avg_level: f64,
}
