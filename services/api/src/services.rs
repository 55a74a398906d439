//! Reporting services
//!
//! Dashboards (home, country, bilateral) always report refugees; the public
//! `/api/v1` endpoints pick one aggregate from their query parameters.

use common::{DatabaseResult, DisplacedCategory};
use tracing::info;

use crate::models::{BilateralReport, ChartRow, CountryReport, GeoRow, HomeReport};
use crate::repositories::{BilateralDal, CountryReportDal, HomeDal};

/// Worldwide overview for the latest year with data
pub struct HomeService<'a, D: ?Sized> {
    dal: &'a D,
}

impl<'a, D: HomeDal + ?Sized> HomeService<'a, D> {
    pub fn new(dal: &'a D) -> Self {
        Self { dal }
    }

    pub async fn fetch_data(&self) -> DatabaseResult<HomeReport> {
        let year = self.dal.fetch_last_available_year_of_data().await?;
        let category = DisplacedCategory::Refugees;
        info!("Building home report for {}", year);

        Ok(HomeReport {
            year,
            coo: self
                .dal
                .fetch_top_10_coo_per_cat_per_year(category, year)
                .await?,
            coa: self
                .dal
                .fetch_top_10_coa_per_cat_per_year(category, year)
                .await?,
            total: self.dal.fetch_total_displaced_serie().await?,
            geo: self.dal.fetch_coo_per_cat_per_year(category, year).await?,
        })
    }
}

/// Refugee flows in and out of one recognized country
pub struct CountryReportService<'a, D: ?Sized> {
    dal: &'a D,
}

impl<'a, D: CountryReportDal + ?Sized> CountryReportService<'a, D> {
    pub fn new(dal: &'a D) -> Self {
        Self { dal }
    }

    pub async fn fetch_data(&self, iso_2: &str) -> DatabaseResult<CountryReport> {
        let (year, country) = self
            .dal
            .fetch_last_available_year_of_data_per_country(iso_2)
            .await?;
        let category = DisplacedCategory::Refugees;
        info!("Building country report for {} in {}", iso_2, year);

        Ok(CountryReport {
            year,
            top_inflow: self
                .dal
                .fetch_agg_coo_top_10_per_cat_per_year_per_cntry(iso_2, category, year)
                .await?,
            top_outflow: self
                .dal
                .fetch_agg_coa_top_10_per_cat_per_year_per_cntry(iso_2, category, year)
                .await?,
            total_inflow: self.dal.fetch_agg_coa_per_cntry(iso_2).await?,
            total_outflow: self.dal.fetch_agg_coo_per_cntry(iso_2).await?,
            inflow_per_country: self
                .dal
                .fetch_agg_coo_per_cntry_per_cat_per_year(iso_2, category, year)
                .await?,
            country,
        })
    }
}

/// Yearly series between an origin and a destination
pub struct BilateralCountriesReportService<'a, D: ?Sized> {
    dal: &'a D,
}

impl<'a, D: BilateralDal + ?Sized> BilateralCountriesReportService<'a, D> {
    pub fn new(dal: &'a D) -> Self {
        Self { dal }
    }

    pub async fn fetch_data(
        &self,
        origin_iso_2: &str,
        destination_iso_2: &str,
    ) -> DatabaseResult<BilateralReport> {
        info!(
            "Building bilateral report from {} to {}",
            origin_iso_2, destination_iso_2
        );

        let country_of_origin = self.dal.get_country(origin_iso_2).await?;
        let country_of_arrival = self.dal.get_country(destination_iso_2).await?;

        let serie = |category: DisplacedCategory| {
            self.dal
                .fetch_agg_per_coo_per_coa_per_cat(origin_iso_2, destination_iso_2, category)
        };

        Ok(BilateralReport {
            refugees: serie(DisplacedCategory::Refugees).await?,
            asylum_seekers: serie(DisplacedCategory::AsyliumSeekers).await?,
            people_of_concern: serie(DisplacedCategory::PeopleOfConcerns).await?,
            country_of_origin,
            country_of_arrival,
        })
    }
}

/// Parameters of a geographic breakdown
#[derive(Debug, Clone)]
pub struct GeoRequest {
    pub country_iso_2: Option<String>,
    pub category: DisplacedCategory,
    pub year: i32,
    /// Top 10 plus "Others" instead of every country
    pub head: bool,
    /// Group by origin instead of destination
    pub origin: bool,
}

pub struct GeoForAPIService<'a, D: ?Sized> {
    dal: &'a D,
}

impl<'a, D: HomeDal + CountryReportDal + ?Sized> GeoForAPIService<'a, D> {
    pub fn new(dal: &'a D) -> Self {
        Self { dal }
    }

    pub async fn fetch_data(&self, request: &GeoRequest) -> DatabaseResult<Vec<GeoRow>> {
        info!("Fetching geo data: {:?}", request);

        let (category, year) = (request.category, request.year);

        match (request.head, request.country_iso_2.as_deref(), request.origin) {
            (true, Some(iso_2), true) => {
                self.dal
                    .fetch_agg_coo_top_10_per_cat_per_year_per_cntry(iso_2, category, year)
                    .await
            }
            (true, Some(iso_2), false) => {
                self.dal
                    .fetch_agg_coa_top_10_per_cat_per_year_per_cntry(iso_2, category, year)
                    .await
            }
            (true, None, true) => {
                self.dal
                    .fetch_top_10_coo_per_cat_per_year(category, year)
                    .await
            }
            (true, None, false) => {
                self.dal
                    .fetch_top_10_coa_per_cat_per_year(category, year)
                    .await
            }
            (false, Some(iso_2), true) => {
                self.dal
                    .fetch_agg_coo_per_cntry_per_cat_per_year(iso_2, category, year)
                    .await
            }
            (false, Some(iso_2), false) => {
                self.dal
                    .fetch_agg_coa_per_cntry_per_cat_per_year(iso_2, category, year)
                    .await
            }
            (false, None, true) => self.dal.fetch_coo_per_cat_per_year(category, year).await,
            (false, None, false) => self.dal.fetch_coa_per_cat_per_year(category, year).await,
        }
    }
}

pub struct TimeSeriesAPIService<'a, D: ?Sized> {
    dal: &'a D,
}

impl<'a, D: HomeDal + CountryReportDal + ?Sized> TimeSeriesAPIService<'a, D> {
    pub fn new(dal: &'a D) -> Self {
        Self { dal }
    }

    /// Without a country, `origin` has no effect
    pub async fn fetch_data(
        &self,
        country_iso_2: Option<&str>,
        category: Option<DisplacedCategory>,
        origin: bool,
    ) -> DatabaseResult<Vec<ChartRow>> {
        info!(
            "Fetching time series: country={:?} category={:?} origin={}",
            country_iso_2, category, origin
        );

        match (category, country_iso_2) {
            (Some(category), Some(iso_2)) if origin => {
                self.dal.fetch_agg_coo_per_cntry_per_cat(iso_2, category).await
            }
            (Some(category), Some(iso_2)) => {
                self.dal.fetch_agg_coa_per_cntry_per_cat(iso_2, category).await
            }
            (Some(category), None) => {
                self.dal
                    .fetch_total_displaced_per_category_serie(category)
                    .await
            }
            (None, Some(iso_2)) if origin => self.dal.fetch_agg_coo_per_cntry(iso_2).await,
            (None, Some(iso_2)) => self.dal.fetch_agg_coa_per_cntry(iso_2).await,
            (None, None) => self.dal.fetch_total_displaced_serie().await,
        }
    }
}

pub struct RelationAPIService<'a, D: ?Sized> {
    dal: &'a D,
}

impl<'a, D: BilateralDal + ?Sized> RelationAPIService<'a, D> {
    pub fn new(dal: &'a D) -> Self {
        Self { dal }
    }

    /// Every category together when none is given
    pub async fn fetch_data(
        &self,
        coo_iso_2: &str,
        coa_iso_2: &str,
        category: Option<DisplacedCategory>,
    ) -> DatabaseResult<Vec<ChartRow>> {
        info!(
            "Fetching relation from {} to {} ({:?})",
            coo_iso_2, coa_iso_2, category
        );

        match category {
            Some(category) => {
                self.dal
                    .fetch_agg_per_coo_per_coa_per_cat(coo_iso_2, coa_iso_2, category)
                    .await
            }
            None => self.dal.fetch_agg_per_coo_per_coa(coo_iso_2, coa_iso_2).await,
        }
    }
}
