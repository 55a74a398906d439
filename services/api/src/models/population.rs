//! Aggregated population rows and the reports built from them
//!
//! Figures and years stay text, exactly as the aggregation functions return
//! them.

use serde::{Deserialize, Serialize};
use sqlx::{Row, postgres::PgRow};

use super::Country;

/// One country in a geographic breakdown
///
/// The "Others" bucket of a top 10 has no `iso_2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoRow {
    pub number: String,
    pub name: String,
    pub iso_2: Option<String>,
}

impl GeoRow {
    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(GeoRow {
            number: row.try_get("number")?,
            name: row.try_get("name")?,
            iso_2: row.try_get("iso_2")?,
        })
    }
}

/// One point of a yearly series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRow {
    pub number: String,
    pub year: String,
}

impl ChartRow {
    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(ChartRow {
            number: row.try_get("number")?,
            year: row.try_get("year")?,
        })
    }
}

/// Worldwide overview of refugees for the latest year with data
#[derive(Debug, Clone, Serialize)]
pub struct HomeReport {
    pub year: i32,
    pub coo: Vec<GeoRow>,
    pub coa: Vec<GeoRow>,
    pub total: Vec<ChartRow>,
    pub geo: Vec<GeoRow>,
}

/// Refugees arriving in and leaving one country
#[derive(Debug, Clone, Serialize)]
pub struct CountryReport {
    pub country: Country,
    pub year: i32,
    pub top_inflow: Vec<GeoRow>,
    pub top_outflow: Vec<GeoRow>,
    pub total_inflow: Vec<ChartRow>,
    pub total_outflow: Vec<ChartRow>,
    pub inflow_per_country: Vec<GeoRow>,
}

/// Yearly series between one origin and one destination
#[derive(Debug, Clone, Serialize)]
pub struct BilateralReport {
    pub country_of_origin: Country,
    pub country_of_arrival: Country,
    pub refugees: Vec<ChartRow>,
    pub asylum_seekers: Vec<ChartRow>,
    pub people_of_concern: Vec<ChartRow>,
}
