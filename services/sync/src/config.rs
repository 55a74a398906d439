//! Settings of the UNHCR sync job

use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;
use std::time::Duration;

/// Sync job configuration, read from `SYNC_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Cron expression with seconds (default: every day at 03:00)
    pub schedule: String,
    /// Root of the UNHCR population API
    pub base_url: String,
    /// Number of slices the origin countries are split into
    pub population_chunks: usize,
    /// HTTP timeout in seconds
    pub request_timeout: u64,
    /// Run once before waiting for the schedule
    pub run_on_start: bool,
}

impl SyncConfig {
    pub fn from_env() -> Result<Self> {
        let config = Config::builder()
            .set_default("schedule", "0 0 3 * * *")?
            .set_default("base_url", "https://api.unhcr.org/population/v1")?
            .set_default("population_chunks", 4i64)?
            .set_default("request_timeout", 30i64)?
            .set_default("run_on_start", false)?
            .add_source(Environment::with_prefix("SYNC").try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}
