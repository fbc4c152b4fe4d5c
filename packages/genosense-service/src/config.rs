use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    // SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    // Where uploaded images are written and served from
    #[serde(default = "default_upload_folder")]
    pub upload_folder: PathBuf,

    // Maximum request body size in bytes
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,

    // Enables development-only endpoints such as /api/sample_data
    #[serde(default = "default_debug")]
    pub debug: bool,

    #[serde(default = "default_forecast_days")]
    pub default_forecast_days: u32,

    #[serde(default = "default_max_forecast_days")]
    pub max_forecast_days: u32,

    // Simulated processing time of the image model, in milliseconds
    #[serde(default = "default_intake_delay_ms")]
    pub intake_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env::<Config>()
    }

    pub fn intake_delay(&self) -> Duration {
        Duration::from_millis(self.intake_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            database_path: default_database_path(),
            upload_folder: default_upload_folder(),
            max_content_length: default_max_content_length(),
            debug: default_debug(),
            default_forecast_days: default_forecast_days(),
            max_forecast_days: default_max_forecast_days(),
            intake_delay_ms: default_intake_delay_ms(),
        }
    }
}

fn default_port() -> u16 {
    5000
}

fn default_database_path() -> PathBuf {
    PathBuf::from("genosense.db")
}

fn default_upload_folder() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_content_length() -> usize {
    16 * 1024 * 1024
}

fn default_debug() -> bool {
    cfg!(debug_assertions)
}

fn default_forecast_days() -> u32 {
    30
}

fn default_max_forecast_days() -> u32 {
    3650
}

fn default_intake_delay_ms() -> u64 {
    2000
}
