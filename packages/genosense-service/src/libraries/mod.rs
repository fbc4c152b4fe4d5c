pub mod spread_forecast;
pub mod trend;
pub mod upload_policy;
