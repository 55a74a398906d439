//! API models for query parameters and response payloads

use serde::{Deserialize, Deserializer};

pub mod country;
pub mod population;

pub use country::Country;
pub use population::{BilateralReport, ChartRow, CountryReport, GeoRow, HomeReport};

fn default_category() -> String {
    "REFUGEES".to_string()
}

fn default_year() -> i32 {
    2022
}

fn default_true() -> bool {
    true
}

/// `true` in any case, anything else is false
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = String::deserialize(deserializer)?;
    Ok(value.eq_ignore_ascii_case("true"))
}

/// Empty or blank values are treated as absent
fn non_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

/// Query of `GET /api/v1/`
#[derive(Debug, Clone, Deserialize)]
pub struct GeoQuery {
    #[serde(default, deserialize_with = "non_blank")]
    pub country: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_year")]
    pub year: i32,
    #[serde(default, deserialize_with = "flag")]
    pub head: bool,
    #[serde(default = "default_true", deserialize_with = "flag")]
    pub origin: bool,
}

/// Query of `GET /api/v1/chart`
#[derive(Debug, Clone, Deserialize)]
pub struct ChartQuery {
    #[serde(default, deserialize_with = "non_blank")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub category: Option<String>,
    #[serde(default = "default_true", deserialize_with = "flag")]
    pub origin: bool,
}

fn default_coo() -> String {
    "UA".to_string()
}

fn default_coa() -> String {
    "US".to_string()
}

/// Query of `GET /api/v1/relations`
#[derive(Debug, Clone, Deserialize)]
pub struct RelationQuery {
    #[serde(default = "default_coo")]
    pub coo: String,
    #[serde(default = "default_coa")]
    pub coa: String,
    #[serde(default, deserialize_with = "non_blank")]
    pub category: Option<String>,
}

/// Query of `GET /reports/bilateral`
#[derive(Debug, Clone, Deserialize)]
pub struct BilateralQuery {
    pub coo: String,
    pub coa: String,
}
