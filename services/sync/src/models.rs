//! UNHCR payloads and the rows built from them

use common::DisplacedCategory;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;

/// Every UNHCR listing wraps its rows in `items`
#[derive(Debug, Deserialize)]
pub struct UnhcrPage<T> {
    pub items: Vec<T>,
}

/// Country as listed by `/countries`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnhcrCountry {
    #[serde(rename = "majorArea", default, deserialize_with = "text")]
    pub major_area: String,
    #[serde(default, deserialize_with = "text")]
    pub region: String,
    #[serde(default, deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "text")]
    pub iso: String,
    #[serde(default, deserialize_with = "text")]
    pub iso2: String,
}

/// Figures between one origin and one arrival country for one year
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnhcrPopulation {
    pub year: i32,
    #[serde(default, deserialize_with = "text")]
    pub coo_iso: String,
    #[serde(default, deserialize_with = "text")]
    pub coa_iso: String,
    #[serde(default, deserialize_with = "count")]
    pub refugees: i32,
    #[serde(default, deserialize_with = "count")]
    pub asylum_seekers: i32,
    #[serde(default, deserialize_with = "count")]
    pub idps: i32,
    #[serde(default, deserialize_with = "count")]
    pub oip: i32,
    #[serde(default, deserialize_with = "count")]
    pub ooc: i32,
    #[serde(default, deserialize_with = "count")]
    pub stateless: i32,
}

impl UnhcrPopulation {
    /// Number stored for each category
    pub fn figures(&self) -> [(DisplacedCategory, i32); 4] {
        [
            (DisplacedCategory::Refugees, self.refugees),
            (
                DisplacedCategory::AsyliumSeekers,
                self.asylum_seekers.saturating_add(self.oip),
            ),
            (DisplacedCategory::InternallyDisplaced, self.idps),
            (
                DisplacedCategory::PeopleOfConcerns,
                self.ooc.saturating_add(self.stateless),
            ),
        ]
    }
}

/// Null becomes an empty string
fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Anything but a non-negative integer counts as 0 (UNHCR publishes "-")
fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_i64()
        .filter(|n| *n >= 0)
        .map(|n| i32::try_from(n).unwrap_or(i32::MAX))
        .unwrap_or(0))
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCountry {
    pub name: String,
    pub iso: String,
    pub iso_2: Option<String>,
    pub is_recognized: bool,
    pub region_id: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPopulation {
    pub number: i32,
    pub year: i32,
    pub category: DisplacedCategory,
    pub country_id: Uuid,
    pub country_arrival_id: Uuid,
}
