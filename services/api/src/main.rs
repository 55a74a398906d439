use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;

#[cfg(test)]
mod testing;

use common::database::{self, DatabaseConfig, init_pool};

use crate::{
    config::ApiConfig,
    middleware::{JwtConfig, JwtVerifier},
    repositories::PgPopulationDal,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting API service");

    let config = ApiConfig::from_env();

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    if db_config.run_migrations {
        database::run_migrations(&pool).await?;
    }

    let jwt_verifier = JwtVerifier::new(&JwtConfig::from_env()?)?;

    let app_state = AppState {
        dal: Arc::new(PgPopulationDal::new(pool)),
        jwt_verifier,
    };

    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("API service listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
