//! Scheduled UNHCR synchronisation

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::database::SyncStore;
use crate::loaders::{GeoLoader, PopulationLoader};
use crate::unhcr::PopulationSource;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Doubled after every failed attempt
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub countries: usize,
    pub population: usize,
}

#[derive(Clone)]
pub struct SyncJob {
    source: Arc<dyn PopulationSource>,
    store: Arc<dyn SyncStore>,
    population_chunks: usize,
    retry: RetryPolicy,
}

impl SyncJob {
    pub fn new(
        source: Arc<dyn PopulationSource>,
        store: Arc<dyn SyncStore>,
        population_chunks: usize,
    ) -> Self {
        Self {
            source,
            store,
            population_chunks,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Countries first, population figures need their ids
    pub async fn run_once(&self) -> Result<SyncReport> {
        let countries = GeoLoader::new(self.source.as_ref(), self.store.as_ref())
            .load()
            .await?;
        let population = PopulationLoader::new(
            self.source.as_ref(),
            self.store.as_ref(),
            self.population_chunks,
        )
        .load()
        .await?;

        Ok(SyncReport {
            countries,
            population,
        })
    }

    /// Runs with exponential backoff between failed attempts
    pub async fn run(&self) -> Result<SyncReport> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.run_once().await {
                Ok(report) => {
                    info!(
                        "UNHCR sync finished: {} countries, {} population rows",
                        report.countries, report.population
                    );
                    return Ok(report);
                }
                Err(e) if attempt < self.retry.max_attempts => {
                    error!(
                        "UNHCR sync failed (attempt {}/{}): {}",
                        attempt, self.retry.max_attempts, e
                    );
                    sleep(self.retry.base_delay * 2u32.pow(attempt)).await;
                }
                Err(e) => {
                    error!("UNHCR sync failed after {} attempts: {}", attempt, e);
                    return Err(e);
                }
            }
        }
    }

    /// Registers the job and starts the scheduler
    pub async fn start(&self, schedule: &str) -> Result<JobScheduler> {
        let job = self.clone();
        let scheduler = JobScheduler::new().await?;

        scheduler
            .add(Job::new_async(schedule, move |_, _| {
                let job = job.clone();
                Box::pin(async move {
                    info!("UNHCR sync job executed");
                    if let Err(e) = job.run().await {
                        error!("Scheduled UNHCR sync failed: {}", e);
                    }
                })
            })?)
            .await?;
        scheduler.start().await?;

        info!("Started UNHCR sync scheduler with schedule: {}", schedule);
        Ok(scheduler)
    }
}
