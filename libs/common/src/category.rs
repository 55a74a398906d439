//! Displacement categories of the population dataset

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Category of displaced people a population figure counts
///
/// The variant names are persisted as-is in the `population.category` column
/// and passed by name to the aggregation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisplacedCategory {
    Refugees,
    AsyliumSeekers,
    InternallyDisplaced,
    PeopleOfConcerns,
}

/// Returned when a category name does not match any variant
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown displaced category: {0}")]
pub struct UnknownCategory(pub String);

impl DisplacedCategory {
    /// Every category, in storage order
    pub const ALL: [DisplacedCategory; 4] = [
        DisplacedCategory::Refugees,
        DisplacedCategory::AsyliumSeekers,
        DisplacedCategory::InternallyDisplaced,
        DisplacedCategory::PeopleOfConcerns,
    ];

    /// Name stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplacedCategory::Refugees => "REFUGEES",
            DisplacedCategory::AsyliumSeekers => "ASYLIUM_SEEKERS",
            DisplacedCategory::InternallyDisplaced => "INTERNALLY_DISPLACED",
            DisplacedCategory::PeopleOfConcerns => "PEOPLE_OF_CONCERNS",
        }
    }
}

impl fmt::Display for DisplacedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplacedCategory {
    type Err = UnknownCategory;

    /// Parses a category name, ignoring ASCII case
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        DisplacedCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownCategory(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            "refugees".parse::<DisplacedCategory>(),
            Ok(DisplacedCategory::Refugees)
        );
        assert_eq!(
            "Asylium_Seekers".parse::<DisplacedCategory>(),
            Ok(DisplacedCategory::AsyliumSeekers)
        );
    }

    #[test]
    fn test_parse_unknown_category() {
        assert_eq!(
            "MIGRANTS".parse::<DisplacedCategory>(),
            Err(UnknownCategory("MIGRANTS".to_string()))
        );
    }

    #[test]
    fn test_serde_uses_stored_names() {
        let json = serde_json::to_string(&DisplacedCategory::PeopleOfConcerns).unwrap();
        assert_eq!(json, "\"PEOPLE_OF_CONCERNS\"");

        for category in DisplacedCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }
}
