use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod database;
mod job;
mod loaders;
mod models;
mod unhcr;

#[cfg(test)]
mod testing;

use common::database::{self as db, DatabaseConfig, init_pool};

use crate::{config::SyncConfig, database::Database, job::SyncJob, unhcr::UnhcrClient};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting UNHCR sync service");

    let config = SyncConfig::from_env()?;

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if db::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    if db_config.run_migrations {
        db::run_migrations(&pool).await?;
    }

    let job = SyncJob::new(
        Arc::new(UnhcrClient::new(&config)?),
        Arc::new(Database::new(pool)),
        config.population_chunks,
    );

    if config.run_on_start {
        if let Err(e) = job.run().await {
            error!("Initial UNHCR sync failed: {}", e);
        }
    }

    let mut scheduler = job.start(&config.schedule).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down UNHCR sync service");
    scheduler.shutdown().await?;

    Ok(())
}
