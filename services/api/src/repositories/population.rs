//! PostgreSQL implementation of the population DAL

use async_trait::async_trait;
use common::{DatabaseError, DatabaseResult, DisplacedCategory};
use sqlx::{PgPool, Row};
use tracing::info;

use super::{BilateralDal, CountryReportDal, HomeDal};
use crate::models::{ChartRow, Country, GeoRow};

/// Calls the aggregation functions installed by the migrations
#[derive(Clone)]
pub struct PgPopulationDal {
    pool: PgPool,
}

impl PgPopulationDal {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn geo_by_year(
        &self,
        function: &str,
        year: i32,
        category: DisplacedCategory,
    ) -> DatabaseResult<Vec<GeoRow>> {
        info!("Fetching {} for {} in {}", function, category, year);

        let rows = sqlx::query(&format!(
            "SELECT number, name, iso_2 FROM {}($1, $2)",
            function
        ))
        .bind(year)
        .bind(category.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| GeoRow::from_row(row).map_err(DatabaseError::from))
            .collect()
    }

    async fn geo_by_country(
        &self,
        function: &str,
        year: i32,
        category: DisplacedCategory,
        iso_2: &str,
    ) -> DatabaseResult<Vec<GeoRow>> {
        info!("Fetching {} for {} {} in {}", function, iso_2, category, year);

        let rows = sqlx::query(&format!(
            "SELECT number, name, iso_2 FROM {}($1, $2, $3)",
            function
        ))
        .bind(year)
        .bind(category.as_str())
        .bind(iso_2)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| GeoRow::from_row(row).map_err(DatabaseError::from))
            .collect()
    }

    /// Yearly series of `function` called with text arguments
    async fn serie(&self, function: &str, args: &[&str]) -> DatabaseResult<Vec<ChartRow>> {
        info!("Fetching {} {:?}", function, args);

        let placeholders = (1..=args.len())
            .map(|i| format!("${}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT number, year FROM {}({})", function, placeholders);

        let mut query = sqlx::query(&sql);
        for arg in args {
            query = query.bind(*arg);
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| ChartRow::from_row(row).map_err(DatabaseError::from))
            .collect()
    }

    async fn recognized_country(&self, iso_2: &str) -> DatabaseResult<Country> {
        let row = sqlx::query(
            r#"
            SELECT id, name, iso, iso_2, is_recognized, region_id
            FROM country
            WHERE iso_2 = $1 AND is_recognized
            "#,
        )
        .bind(iso_2)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DatabaseError::NoEntityFound("country"))?;

        Ok(Country::from_row(&row)?)
    }
}

#[async_trait]
impl HomeDal for PgPopulationDal {
    async fn fetch_top_10_coo_per_cat_per_year(
        &self,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>> {
        self.geo_by_year("aggcootop10percatperyear", year, category)
            .await
    }

    async fn fetch_top_10_coa_per_cat_per_year(
        &self,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>> {
        self.geo_by_year("aggcoatop10percatperyear", year, category)
            .await
    }

    async fn fetch_total_displaced_serie(&self) -> DatabaseResult<Vec<ChartRow>> {
        self.serie("aggcoo", &[]).await
    }

    async fn fetch_total_displaced_per_category_serie(
        &self,
        category: DisplacedCategory,
    ) -> DatabaseResult<Vec<ChartRow>> {
        self.serie("aggcoopercat", &[category.as_str()]).await
    }

    async fn fetch_coo_per_cat_per_year(
        &self,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>> {
        self.geo_by_year("aggcoopercatperyear", year, category).await
    }

    async fn fetch_coa_per_cat_per_year(
        &self,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>> {
        self.geo_by_year("aggcoapercatperyear", year, category).await
    }

    async fn fetch_last_available_year_of_data(&self) -> DatabaseResult<i32> {
        let row = sqlx::query("SELECT year FROM population ORDER BY year DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DatabaseError::NoEntityFound("population"))?;

        Ok(row.try_get("year")?)
    }
}

#[async_trait]
impl CountryReportDal for PgPopulationDal {
    async fn fetch_agg_coo_top_10_per_cat_per_year_per_cntry(
        &self,
        iso_2: &str,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>> {
        self.geo_by_country("aggcootop10percatperyearpercntry", year, category, iso_2)
            .await
    }

    async fn fetch_agg_coa_top_10_per_cat_per_year_per_cntry(
        &self,
        iso_2: &str,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>> {
        self.geo_by_country("aggcoatop10percatperyearpercntry", year, category, iso_2)
            .await
    }

    async fn fetch_agg_coa_per_cntry(&self, iso_2: &str) -> DatabaseResult<Vec<ChartRow>> {
        self.serie("aggcoapercntry", &[iso_2]).await
    }

    async fn fetch_agg_coo_per_cntry(&self, iso_2: &str) -> DatabaseResult<Vec<ChartRow>> {
        self.serie("aggcoopercntry", &[iso_2]).await
    }

    async fn fetch_agg_coo_per_cntry_per_cat(
        &self,
        iso_2: &str,
        category: DisplacedCategory,
    ) -> DatabaseResult<Vec<ChartRow>> {
        self.serie("aggcoopercntrypercat", &[iso_2, category.as_str()])
            .await
    }

    async fn fetch_agg_coa_per_cntry_per_cat(
        &self,
        iso_2: &str,
        category: DisplacedCategory,
    ) -> DatabaseResult<Vec<ChartRow>> {
        self.serie("aggcoapercntrypercat", &[iso_2, category.as_str()])
            .await
    }

    async fn fetch_agg_coo_per_cntry_per_cat_per_year(
        &self,
        iso_2: &str,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>> {
        self.geo_by_country("aggcooperyearpercatpercntry", year, category, iso_2)
            .await
    }

    async fn fetch_agg_coa_per_cntry_per_cat_per_year(
        &self,
        iso_2: &str,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>> {
        self.geo_by_country("aggcoaperyearpercatpercntry", year, category, iso_2)
            .await
    }

    async fn fetch_last_available_year_of_data_per_country(
        &self,
        iso_2: &str,
    ) -> DatabaseResult<(i32, Country)> {
        let country = self.recognized_country(iso_2).await?;

        let row = sqlx::query(
            r#"
            SELECT year
            FROM population
            WHERE country_id = $1 OR country_arrival_id = $1
            ORDER BY year DESC
            LIMIT 1
            "#,
        )
        .bind(country.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DatabaseError::NoEntityFound("population"))?;

        Ok((row.try_get("year")?, country))
    }
}

#[async_trait]
impl BilateralDal for PgPopulationDal {
    async fn fetch_agg_per_coo_per_coa_per_cat(
        &self,
        coo_iso_2: &str,
        coa_iso_2: &str,
        category: DisplacedCategory,
    ) -> DatabaseResult<Vec<ChartRow>> {
        self.serie(
            "aggpercoopercoapercat",
            &[coo_iso_2, coa_iso_2, category.as_str()],
        )
        .await
    }

    async fn fetch_agg_per_coo_per_coa(
        &self,
        coo_iso_2: &str,
        coa_iso_2: &str,
    ) -> DatabaseResult<Vec<ChartRow>> {
        self.serie("aggpercoopercoaper", &[coo_iso_2, coa_iso_2])
            .await
    }

    async fn get_country(&self, iso_2: &str) -> DatabaseResult<Country> {
        self.recognized_country(iso_2).await
    }
}
