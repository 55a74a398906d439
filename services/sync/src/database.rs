use crate::models::{NewCountry, NewPopulation};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use uuid::Uuid;

/// Writes performed by the loaders
#[async_trait]
pub trait SyncStore: Send + Sync {
    /// Id of the continent with this name, created when missing
    async fn continent_id(&self, name: &str) -> Result<Uuid>;

    /// Id of the region with this name, created under `continent_id` when missing
    async fn region_id(&self, name: &str, continent_id: Uuid) -> Result<Uuid>;

    /// Returns false when a country with that name already exists
    async fn insert_country_if_absent(&self, country: &NewCountry) -> Result<bool>;

    /// Country ids keyed by ISO-3 code
    async fn country_ids(&self) -> Result<HashMap<String, Uuid>>;

    /// Returns false when the (year, origin, arrival, category) row already exists
    async fn insert_population_if_absent(&self, population: &NewPopulation) -> Result<bool>;
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SyncStore for Database {
    async fn continent_id(&self, name: &str) -> Result<Uuid> {
        let row = sqlx::query(
            "INSERT INTO continent (id, name)
             VALUES ($1, $2)
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    async fn region_id(&self, name: &str, continent_id: Uuid) -> Result<Uuid> {
        let row = sqlx::query(
            "INSERT INTO region (id, name, continent_id)
             VALUES ($1, $2, $3)
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(continent_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    async fn insert_country_if_absent(&self, country: &NewCountry) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO country (id, name, iso, iso_2, is_recognized, region_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(&country.name)
        .bind(&country.iso)
        .bind(&country.iso_2)
        .bind(country.is_recognized)
        .bind(country.region_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn country_ids(&self) -> Result<HashMap<String, Uuid>> {
        let rows = sqlx::query("SELECT id, iso FROM country ORDER BY iso")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("iso"), row.get("id")))
            .collect())
    }

    async fn insert_population_if_absent(&self, population: &NewPopulation) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO population (id, number, year, category, country_id, country_arrival_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (year, country_id, country_arrival_id, category) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(population.number)
        .bind(population.year)
        .bind(population.category.as_str())
        .bind(population.country_id)
        .bind(population.country_arrival_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
