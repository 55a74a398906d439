use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod domain;
mod email;
mod entities;
mod error;
mod jwt;
mod mappers;
mod middleware;
mod oauth;
mod password;
mod repositories;
mod routes;
mod services;
mod session;
mod unit_of_work;
mod validation;

#[cfg(test)]
mod testing;

use common::cache::{RedisConfig, RedisPool};
use common::database::{self, DatabaseConfig, init_pool};
use sqlx::PgPool;

use crate::{
    config::AuthConfig,
    email::{EmailConfig, EmailSender, SendGridSender},
    jwt::{JwtConfig, JwtService},
    oauth::{OAuthClients, OAuthConfig, clients_from_config},
    password::{Argon2Hasher, PasswordHasher},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AuthConfig>,
    pub db_pool: PgPool,
    pub redis_pool: RedisPool,
    pub jwt_service: JwtService,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub email_sender: Arc<dyn EmailSender>,
    pub oauth_clients: Arc<OAuthClients>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting authentication service");

    let config = AuthConfig::from_env();

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

    let jwt_service = JwtService::new(JwtConfig::from_env()?)?;

    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    let email_sender = SendGridSender::new(EmailConfig::from_env()?);
    let oauth_clients = clients_from_config(&OAuthConfig::from_env())?;
    info!("OAuth providers enabled: {}", oauth_clients.len());

    let bind_address = config.bind_address.clone();
    let app_state = AppState {
        config: Arc::new(config),
        db_pool: pool,
        redis_pool,
        jwt_service,
        password_hasher: Arc::new(Argon2Hasher),
        email_sender: Arc::new(email_sender),
        oauth_clients: Arc::new(oauth_clients),
    };

    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Authentication service listening on {}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
