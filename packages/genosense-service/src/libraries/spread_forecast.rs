use geo::{EuclideanDistance, Point};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::InfectionPoint;

/// Absolute cap on synthesized points per forecast
const MAX_NEW_POINTS: usize = 100;

/// Fraction of point-days that may turn into new points
const NEW_POINTS_PER_POINT_DAY: f64 = 0.1;

/// Spread radius in degrees for a one-day horizon; grows with sqrt(days)
const BASE_SPREAD_DEGREES: f64 = 0.005;

/// Daily relative increase of infection severity
const DAILY_GROWTH: f64 = 0.005;

/// Floor applied to the level of every synthesized point
const MIN_NEW_LEVEL: f64 = 0.1;

/// Number of intermediate snapshots aimed for (plus the initial one)
const TARGET_TIMEFRAMES: u32 = 5;

/// Snapshot of the infection state at a day offset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeframe {
    pub day: u32,
    pub points: Vec<InfectionPoint>,
}

/// Output of a spread forecast, returned verbatim by `/api/predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub initial_state: Vec<InfectionPoint>,
    pub final_state: Vec<InfectionPoint>,
    pub timeframes: Vec<Timeframe>,
}

impl ForecastResult {
    fn empty() -> Self {
        Self {
            initial_state: Vec::new(),
            final_state: Vec::new(),
            timeframes: vec![Timeframe {
                day: 0,
                points: Vec::new(),
            }],
        }
    }

    /// Number of points synthesized by the forecast
    pub fn new_point_count(&self) -> usize {
        self.final_state.len() - self.initial_state.len()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastError {
    #[error("Forecast horizon must be a non-negative number of days, got {0}")]
    NegativeHorizon(i64),

    #[error("Forecast horizon of {requested} days exceeds the maximum of {max}")]
    HorizonTooLarge { requested: i64, max: u32 },
}

/// Check a caller-supplied horizon and narrow it to a day count
pub fn validate_horizon(days: i64, max_days: u32) -> Result<u32, ForecastError> {
    if days < 0 {
        return Err(ForecastError::NegativeHorizon(days));
    }
    if days > i64::from(max_days) {
        return Err(ForecastError::HorizonTooLarge {
            requested: days,
            max: max_days,
        });
    }
    Ok(days as u32)
}

/// How many new points a forecast over `point_count` points and
/// `horizon_days` days may synthesize.
pub fn synthesis_budget(point_count: usize, horizon_days: u32) -> usize {
    let point_days = point_count as u64 * u64::from(horizon_days);
    let capped = (MAX_NEW_POINTS as u64).min(point_days / 10) as usize;
    let proportional = (point_days as f64 * NEW_POINTS_PER_POINT_DAY) as usize;
    capped.min(proportional)
}

/// Spacing between timeframe days
pub fn timeframe_step(horizon_days: u32) -> u32 {
    (horizon_days / TARGET_TIMEFRAMES).max(1)
}

fn grown_level(level: f64, days: u32) -> f64 {
    (level * (1.0 + f64::from(days) * DAILY_GROWTH)).clamp(0.0, 1.0)
}

/// Forecast infection spread `horizon_days` into the future using a
/// thread-local random source.
pub fn forecast_spread(current: &[InfectionPoint], horizon_days: u32) -> ForecastResult {
    forecast(current, horizon_days, &mut rand::thread_rng())
}

/// Forecast infection spread `horizon_days` into the future.
///
/// New points are seeded from uniformly chosen members of the growing working
/// list, so synthesized points may seed further points within the same run.
/// Every level in the result is clamped to `[0, 1]`; original points only ever
/// grow, synthesized points never drop below 0.1.
///
/// Timeframe levels are computed from the original input at each day offset,
/// not compounded from the previous timeframe.
pub fn forecast<R: Rng + ?Sized>(
    current: &[InfectionPoint],
    horizon_days: u32,
    rng: &mut R,
) -> ForecastResult {
    if current.is_empty() {
        return ForecastResult::empty();
    }

    info!(
        "Predicting spread for {} days based on {} infection points",
        horizon_days,
        current.len()
    );

    let new_count = synthesis_budget(current.len(), horizon_days);
    let mut working = current.to_vec();
    working.reserve(new_count);

    if new_count > 0 {
        let spread_distance = BASE_SPREAD_DEGREES * f64::from(horizon_days).sqrt();
        for _ in 0..new_count {
            let source = working[rng.gen_range(0..working.len())];

            let lat_offset = (rng.gen::<f64>() - 0.5) * spread_distance;
            let lng_offset = (rng.gen::<f64>() - 0.5) * spread_distance;

            let distance =
                Point::new(lng_offset, lat_offset).euclidean_distance(&Point::new(0.0, 0.0));
            let level = (source.level * (1.0 - distance / spread_distance))
                .max(MIN_NEW_LEVEL)
                .min(1.0);

            working.push(InfectionPoint::new(
                source.latitude + lat_offset,
                source.longitude + lng_offset,
                level,
            ));
        }
    }

    for point in working.iter_mut() {
        point.level = grown_level(point.level, horizon_days);
    }

    let timeframes = build_timeframes(current, &working[current.len()..], horizon_days);

    ForecastResult {
        initial_state: current.to_vec(),
        final_state: working,
        timeframes,
    }
}

fn build_timeframes(
    current: &[InfectionPoint],
    synthesized: &[InfectionPoint],
    horizon_days: u32,
) -> Vec<Timeframe> {
    let new_count = synthesized.len();

    (0..=horizon_days)
        .step_by(timeframe_step(horizon_days) as usize)
        .map(|day| {
            if day == 0 {
                return Timeframe {
                    day,
                    points: current.to_vec(),
                };
            }

            let ratio = f64::from(day) / f64::from(horizon_days);
            let visible = ((new_count as f64 * ratio) as usize).min(new_count);

            let points = current
                .iter()
                .map(|p| InfectionPoint {
                    level: grown_level(p.level, day),
                    ..*p
                })
                .chain(synthesized[..visible].iter().copied())
                .collect();

            Timeframe { day, points }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_points(n: usize) -> Vec<InfectionPoint> {
        (0..n)
            .map(|i| {
                InfectionPoint::new(
                    3.0 + i as f64 * 0.01,
                    101.0 - i as f64 * 0.01,
                    (i % 10) as f64 / 10.0,
                )
            })
            .collect()
    }

    fn expected_timeframe_count(days: u32) -> usize {
        (days / timeframe_step(days)) as usize + 1
    }

    #[test]
    fn test_empty_input_is_trivial() {
        let mut rng = StdRng::seed_from_u64(1);
        for days in [0, 1, 30, 365] {
            let result = forecast(&[], days, &mut rng);
            assert!(result.initial_state.is_empty());
            assert!(result.final_state.is_empty());
            assert_eq!(
                result.timeframes,
                vec![Timeframe {
                    day: 0,
                    points: vec![]
                }]
            );
        }
    }

    #[test]
    fn test_zero_horizon_has_no_growth() {
        let points = sample_points(25);
        let result = forecast(&points, 0, &mut StdRng::seed_from_u64(7));

        assert_eq!(result.final_state, points);
        assert_eq!(result.new_point_count(), 0);
        assert_eq!(result.timeframes.len(), 1);
        assert_eq!(result.timeframes[0].day, 0);
        assert_eq!(result.timeframes[0].points, points);
    }

    #[test]
    fn test_single_point_ten_days() {
        let points = vec![InfectionPoint::new(1.0, 101.0, 0.5)];
        let result = forecast(&points, 10, &mut StdRng::seed_from_u64(42));

        assert_eq!(result.final_state.len(), 2);
        assert!((result.final_state[0].level - 0.525).abs() < 1e-12);
        assert_eq!(result.final_state[0].latitude, 1.0);
        assert_eq!(result.final_state[0].longitude, 101.0);

        // Offsets stay within half the spread radius on each axis
        let spread = 0.005 * 10f64.sqrt();
        let synthesized = result.final_state[1];
        assert!((synthesized.latitude - 1.0).abs() <= spread / 2.0);
        assert!((synthesized.longitude - 101.0).abs() <= spread / 2.0);
        assert!(synthesized.level >= 0.1 && synthesized.level <= 1.0);

        // step = 2, so days 0, 2, 4, 6, 8, 10
        let days: Vec<u32> = result.timeframes.iter().map(|t| t.day).collect();
        assert_eq!(days, vec![0, 2, 4, 6, 8, 10]);
        assert_eq!(result.timeframes[1].points.len(), 1);
        assert_eq!(result.timeframes[5].points.len(), 2);
        assert_eq!(result.timeframes[5].points[1], synthesized);
    }

    #[test]
    fn test_synthesis_budget_caps() {
        assert_eq!(synthesis_budget(1, 10), 1);
        assert_eq!(synthesis_budget(1, 9), 0);
        assert_eq!(synthesis_budget(25, 30), 75);
        assert_eq!(synthesis_budget(50, 30), 100);
        assert_eq!(synthesis_budget(10_000, 3650), 100);
        assert_eq!(synthesis_budget(0, 30), 0);
        assert_eq!(synthesis_budget(25, 0), 0);
    }

    #[test]
    fn test_final_state_length_and_bounds() {
        let points = sample_points(40);
        for (seed, days) in [(1u64, 1u32), (2, 7), (3, 30), (4, 90), (5, 365)] {
            let result = forecast(&points, days, &mut StdRng::seed_from_u64(seed));
            let budget = synthesis_budget(points.len(), days);

            assert_eq!(result.final_state.len(), points.len() + budget);
            assert!(budget <= 100usize.min(points.len() * days as usize / 10));

            for (original, grown) in points.iter().zip(&result.final_state) {
                assert!(grown.level >= original.level);
                assert!(grown.level <= 1.0);
            }
            for synthesized in &result.final_state[points.len()..] {
                assert!(synthesized.level >= 0.1 && synthesized.level <= 1.0);
            }
        }
    }

    #[test]
    fn test_timeframes_shape() {
        let points = sample_points(12);
        for days in [1u32, 4, 5, 10, 29, 30, 31, 100] {
            let result = forecast(&points, days, &mut StdRng::seed_from_u64(days as u64));
            assert_eq!(result.timeframes.len(), expected_timeframe_count(days));
            assert_eq!(result.timeframes[0].day, 0);
            assert_eq!(result.timeframes[0].points, points);

            let step = timeframe_step(days);
            for (i, frame) in result.timeframes.iter().enumerate() {
                assert_eq!(frame.day, i as u32 * step);
                assert!(frame.day <= days);
            }
        }
    }

    #[test]
    fn test_timeframe_levels_scale_from_original() {
        let points = sample_points(20);
        let days = 30;
        let result = forecast(&points, days, &mut StdRng::seed_from_u64(99));
        let new_points = &result.final_state[points.len()..];

        for frame in result.timeframes.iter().skip(1) {
            for (original, snapshot) in points.iter().zip(&frame.points) {
                let expected = (original.level * (1.0 + frame.day as f64 * 0.005)).min(1.0);
                assert_eq!(snapshot.level, expected);
                assert!(snapshot.level >= original.level);
            }

            let visible = (new_points.len() as f64 * (frame.day as f64 / days as f64)) as usize;
            assert_eq!(frame.points.len(), points.len() + visible);
            // Synthesized points appear in synthesis order
            assert_eq!(&frame.points[points.len()..], &new_points[..visible]);
        }
    }

    #[test]
    fn test_input_not_mutated() {
        let points = sample_points(30);
        let before = points.clone();
        let result = forecast(&points, 60, &mut StdRng::seed_from_u64(5));
        assert_eq!(points, before);
        assert_eq!(result.initial_state, before);
    }

    #[test]
    fn test_levels_never_exceed_one() {
        let points = vec![
            InfectionPoint::new(2.0, 100.0, 1.0),
            InfectionPoint::new(2.1, 100.1, 0.99),
        ];
        let result = forecast(&points, 365, &mut StdRng::seed_from_u64(11));
        for point in result
            .final_state
            .iter()
            .chain(result.timeframes.iter().flat_map(|t| t.points.iter()))
        {
            assert!(point.level <= 1.0);
        }
        assert_eq!(result.final_state[0].level, 1.0);
    }

    #[test]
    fn test_seeded_forecast_is_reproducible() {
        let points = sample_points(15);
        let a = forecast(&points, 45, &mut StdRng::seed_from_u64(2024));
        let b = forecast(&points, 45, &mut StdRng::seed_from_u64(2024));
        assert_eq!(a, b);
    }

    #[test]
    fn test_validate_horizon() {
        assert_eq!(validate_horizon(0, 3650), Ok(0));
        assert_eq!(validate_horizon(30, 3650), Ok(30));
        assert_eq!(
            validate_horizon(-1, 3650),
            Err(ForecastError::NegativeHorizon(-1))
        );
        assert_eq!(
            validate_horizon(4000, 3650),
            Err(ForecastError::HorizonTooLarge {
                requested: 4000,
                max: 3650
            })
        );
    }

    #[test]
    fn test_result_wire_format() {
        let points = vec![InfectionPoint::new(1.0, 101.0, 0.5)];
        let result = forecast(&points, 0, &mut StdRng::seed_from_u64(0));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "initial_state": [{"lat": 1.0, "lng": 101.0, "level": 0.5}],
                "final_state": [{"lat": 1.0, "lng": 101.0, "level": 0.5}],
                "timeframes": [{"day": 0, "points": [{"lat": 1.0, "lng": 101.0, "level": 0.5}]}]
            })
        );
    }
}
