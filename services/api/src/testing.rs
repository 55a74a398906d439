//! In-memory DAL for service and route tests
//!
//! Every aggregate answers with a single row naming the SQL function it
//! stands for, so tests can tell which branch a service took.

use async_trait::async_trait;
use common::{DatabaseError, DatabaseResult, DisplacedCategory};
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::{ChartRow, Country, GeoRow};
use crate::repositories::{BilateralDal, CountryReportDal, HomeDal};

#[derive(Default)]
pub struct RecordingDal {
    pub last_year: Option<i32>,
    pub countries: Vec<Country>,
    calls: Mutex<Vec<String>>,
}

pub fn country(name: &str, iso_2: &str) -> Country {
    Country {
        id: Uuid::new_v4(),
        name: name.to_string(),
        iso: format!("{}X", iso_2),
        iso_2: Some(iso_2.to_string()),
        is_recognized: true,
        region_id: Uuid::new_v4(),
    }
}

impl RecordingDal {
    /// Data up to 2024 for Gondor and Azeroth
    pub fn seeded() -> Self {
        Self {
            last_year: Some(2024),
            countries: vec![country("Gondor", "GD"), country("Azeroth", "AZ")],
            ..Default::default()
        }
    }

    /// Calls as `function(arguments)`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn geo(&self, function: &str, args: String) -> DatabaseResult<Vec<GeoRow>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}({})", function, args));
        Ok(vec![GeoRow {
            number: "1".to_string(),
            name: function.to_string(),
            iso_2: None,
        }])
    }

    fn chart(&self, function: &str, args: String) -> DatabaseResult<Vec<ChartRow>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}({})", function, args));
        Ok(vec![ChartRow {
            number: function.to_string(),
            year: "2024".to_string(),
        }])
    }

    fn find_country(&self, iso_2: &str) -> DatabaseResult<Country> {
        self.countries
            .iter()
            .find(|country| country.iso_2.as_deref() == Some(iso_2) && country.is_recognized)
            .cloned()
            .ok_or(DatabaseError::NoEntityFound("country"))
    }
}

#[async_trait]
impl HomeDal for RecordingDal {
    async fn fetch_top_10_coo_per_cat_per_year(
        &self,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>> {
        self.geo("aggcootop10percatperyear", format!("{}, {}", year, category))
    }

    async fn fetch_top_10_coa_per_cat_per_year(
        &self,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>> {
        self.geo("aggcoatop10percatperyear", format!("{}, {}", year, category))
    }

    async fn fetch_total_displaced_serie(&self) -> DatabaseResult<Vec<ChartRow>> {
        self.chart("aggcoo", String::new())
    }

    async fn fetch_total_displaced_per_category_serie(
        &self,
        category: DisplacedCategory,
    ) -> DatabaseResult<Vec<ChartRow>> {
        self.chart("aggcoopercat", category.to_string())
    }

    async fn fetch_coo_per_cat_per_year(
        &self,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>> {
        self.geo("aggcoopercatperyear", format!("{}, {}", year, category))
    }

    async fn fetch_coa_per_cat_per_year(
        &self,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>> {
        self.geo("aggcoapercatperyear", format!("{}, {}", year, category))
    }

    async fn fetch_last_available_year_of_data(&self) -> DatabaseResult<i32> {
        self.last_year
            .ok_or(DatabaseError::NoEntityFound("population"))
    }
}

#[async_trait]
impl CountryReportDal for RecordingDal {
    async fn fetch_agg_coo_top_10_per_cat_per_year_per_cntry(
        &self,
        iso_2: &str,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>> {
        self.geo(
            "aggcootop10percatperyearpercntry",
            format!("{}, {}, {}", year, category, iso_2),
        )
    }

    async fn fetch_agg_coa_top_10_per_cat_per_year_per_cntry(
        &self,
        iso_2: &str,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>> {
        self.geo(
            "aggcoatop10percatperyearpercntry",
            format!("{}, {}, {}", year, category, iso_2),
        )
    }

    async fn fetch_agg_coa_per_cntry(&self, iso_2: &str) -> DatabaseResult<Vec<ChartRow>> {
        self.chart("aggcoapercntry", iso_2.to_string())
    }

    async fn fetch_agg_coo_per_cntry(&self, iso_2: &str) -> DatabaseResult<Vec<ChartRow>> {
        self.chart("aggcoopercntry", iso_2.to_string())
    }

    async fn fetch_agg_coo_per_cntry_per_cat(
        &self,
        iso_2: &str,
        category: DisplacedCategory,
    ) -> DatabaseResult<Vec<ChartRow>> {
        self.chart("aggcoopercntrypercat", format!("{}, {}", iso_2, category))
    }

    async fn fetch_agg_coa_per_cntry_per_cat(
        &self,
        iso_2: &str,
        category: DisplacedCategory,
    ) -> DatabaseResult<Vec<ChartRow>> {
        self.chart("aggcoapercntrypercat", format!("{}, {}", iso_2, category))
    }

    async fn fetch_agg_coo_per_cntry_per_cat_per_year(
        &self,
        iso_2: &str,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>> {
        self.geo(
            "aggcooperyearpercatpercntry",
            format!("{}, {}, {}", year, category, iso_2),
        )
    }

    async fn fetch_agg_coa_per_cntry_per_cat_per_year(
        &self,
        iso_2: &str,
        category: DisplacedCategory,
        year: i32,
    ) -> DatabaseResult<Vec<GeoRow>> {
        self.geo(
            "aggcoaperyearpercatpercntry",
            format!("{}, {}, {}", year, category, iso_2),
        )
    }

    async fn fetch_last_available_year_of_data_per_country(
        &self,
        iso_2: &str,
    ) -> DatabaseResult<(i32, Country)> {
        let country = self.find_country(iso_2)?;
        let year = self
            .last_year
            .ok_or(DatabaseError::NoEntityFound("population"))?;
        Ok((year, country))
    }
}

#[async_trait]
impl BilateralDal for RecordingDal {
    async fn fetch_agg_per_coo_per_coa_per_cat(
        &self,
        coo_iso_2: &str,
        coa_iso_2: &str,
        category: DisplacedCategory,
    ) -> DatabaseResult<Vec<ChartRow>> {
        self.chart(
            "aggpercoopercoapercat",
            format!("{}, {}, {}", coo_iso_2, coa_iso_2, category),
        )
    }

    async fn fetch_agg_per_coo_per_coa(
        &self,
        coo_iso_2: &str,
        coa_iso_2: &str,
    ) -> DatabaseResult<Vec<ChartRow>> {
        self.chart(
            "aggpercoopercoaper",
            format!("{}, {}", coo_iso_2, coa_iso_2),
        )
    }

    async fn get_country(&self, iso_2: &str) -> DatabaseResult<Country> {
        self.find_country(iso_2)
    }
}
