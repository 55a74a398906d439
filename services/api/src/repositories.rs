//! Data access for the population reports
//!
//! Every aggregate is computed by a PostgreSQL function. The traits split
//! those calls by the report that needs them, and [`PgPopulationDal`] is the
//! single implementation backed by the pool.

use async_trait::async_trait;
use common::{DatabaseResult, DisplacedCategory};

use crate::models::{ChartRow, Country, GeoRow};

pub mod population;

pub use population::PgPopulationDal;

/// Worldwide aggregates
#[async_trait]
pub trait HomeDal: Send + Sync {
    async fn fetch_top_10_coo_per_cat_per_year(
        &self,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>>;

    async fn fetch_top_10_coa_per_cat_per_year(
        &self,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>>;

    /// Every category, every year
    async fn fetch_total_displaced_serie(&self) -> DatabaseResult<Vec<ChartRow>>;

    async fn fetch_total_displaced_per_category_serie(
        &self,
        category: DisplacedCategory,
    ) -> DatabaseResult<Vec<ChartRow>>;

    async fn fetch_coo_per_cat_per_year(
        &self,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>>;

    async fn fetch_coa_per_cat_per_year(
        &self,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>>;

    /// `NoEntityFound` when there is no population data at all
    async fn fetch_last_available_year_of_data(&self) -> DatabaseResult<i32>;
}

/// Aggregates around one country
#[async_trait]
pub trait CountryReportDal: Send + Sync {
    /// Top 10 origins of the people arriving in the country
    async fn fetch_agg_coo_top_10_per_cat_per_year_per_cntry(
        &self,
        iso_2: &str,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>>;

    /// Top 10 destinations of the people leaving the country
    async fn fetch_agg_coa_top_10_per_cat_per_year_per_cntry(
        &self,
        iso_2: &str,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>>;

    /// Yearly arrivals in the country
    async fn fetch_agg_coa_per_cntry(&self, iso_2: &str) -> DatabaseResult<Vec<ChartRow>>;

    /// Yearly departures from the country
    async fn fetch_agg_coo_per_cntry(&self, iso_2: &str) -> DatabaseResult<Vec<ChartRow>>;

    async fn fetch_agg_coo_per_cntry_per_cat(
        &self,
        iso_2: &str,
        category: DisplacedCategory,
    ) -> DatabaseResult<Vec<ChartRow>>;

    async fn fetch_agg_coa_per_cntry_per_cat(
        &self,
        iso_2: &str,
        category: DisplacedCategory,
    ) -> DatabaseResult<Vec<ChartRow>>;

    /// Every origin of the people arriving in the country
    async fn fetch_agg_coo_per_cntry_per_cat_per_year(
        &self,
        iso_2: &str,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>>;

    /// Every destination of the people leaving the country
    async fn fetch_agg_coa_per_cntry_per_cat_per_year(
        &self,
        iso_2: &str,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>>;

    /// Latest year the recognized country appears as origin or destination
    async fn fetch_last_available_year_of_data_per_country(
        &self,
        iso_2: &str,
    ) -> DatabaseResult<(i32, Country)>;
}

/// Flows between two countries
#[async_trait]
pub trait BilateralDal: Send + Sync {
    async fn fetch_agg_per_coo_per_coa_per_cat(
        &self,
        coo_iso_2: &str,
        coa_iso_2: &str,
        category: DisplacedCategory,
    ) -> DatabaseResult<Vec<ChartRow>>;

    async fn fetch_agg_per_coo_per_coa(
        &self,
        coo_iso_2: &str,
        coa_iso_2: &str,
    ) -> DatabaseResult<Vec<ChartRow>>;

    /// Recognized country by ISO-2 code
    async fn get_country(&self, iso_2: &str) -> DatabaseResult<Country>;
}

/// Everything the reporting routes need
pub trait PopulationDal: HomeDal + CountryReportDal + BilateralDal {}

impl<T: HomeDal + CountryReportDal + BilateralDal> PopulationDal for T {}
