//! Loaders copying UNHCR data into the database

use anyhow::Result;
use isocountry::CountryCode;
use tracing::{info, warn};

use crate::database::SyncStore;
use crate::models::{NewCountry, NewPopulation, UnhcrCountry};
use crate::unhcr::PopulationSource;

const NOT_AVAILABLE: &str = "NA";

/// Officially assigned ISO 3166-1 alpha-2 code, ignoring ASCII case
fn is_official_alpha_2(code: &str) -> bool {
    CountryCode::for_alpha2(&code.to_ascii_uppercase()).is_ok()
}

fn or_not_available(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_AVAILABLE
    } else {
        value
    }
}

/// Continents, regions and countries
pub struct GeoLoader<'a> {
    source: &'a dyn PopulationSource,
    store: &'a dyn SyncStore,
}

impl<'a> GeoLoader<'a> {
    pub fn new(source: &'a dyn PopulationSource, store: &'a dyn SyncStore) -> Self {
        Self { source, store }
    }

    /// Returns the number of countries created
    pub async fn load(&self) -> Result<usize> {
        let countries = self.source.countries().await?;
        info!("Loading {} UNHCR countries", countries.len());

        let mut created = 0;
        for country in &countries {
            match self.load_country(country).await {
                Ok(true) => created += 1,
                Ok(false) => {}
                Err(e) => warn!("Skipping country {}: {}", country.name, e),
            }
        }

        info!("Created {} countries", created);
        Ok(created)
    }

    async fn load_country(&self, country: &UnhcrCountry) -> Result<bool> {
        let continent_id = self
            .store
            .continent_id(or_not_available(&country.major_area))
            .await?;
        let region_id = self
            .store
            .region_id(or_not_available(&country.region), continent_id)
            .await?;

        let iso_2 = Some(country.iso2.trim())
            .filter(|code| !code.is_empty())
            .map(str::to_string);

        self.store
            .insert_country_if_absent(&NewCountry {
                name: or_not_available(&country.name).to_string(),
                iso: or_not_available(&country.iso).to_string(),
                is_recognized: iso_2.as_deref().is_some_and(is_official_alpha_2),
                iso_2,
                region_id,
            })
            .await
    }
}

/// Splits `codes` into `parts` equal slices plus one slice holding the remainder
pub fn chunk(codes: &[String], parts: usize) -> Vec<&[String]> {
    let size = codes.len() / parts.max(1);
    if size == 0 {
        return vec![codes];
    }

    let (even, remainder) = codes.split_at(size * parts.max(1));
    let mut chunks: Vec<&[String]> = even.chunks(size).collect();
    if !remainder.is_empty() {
        chunks.push(remainder);
    }
    chunks
}

/// Population figures between every pair of known countries
pub struct PopulationLoader<'a> {
    source: &'a dyn PopulationSource,
    store: &'a dyn SyncStore,
    chunks: usize,
}

impl<'a> PopulationLoader<'a> {
    pub fn new(source: &'a dyn PopulationSource, store: &'a dyn SyncStore, chunks: usize) -> Self {
        Self {
            source,
            store,
            chunks,
        }
    }

    /// Returns the number of rows inserted
    pub async fn load(&self) -> Result<usize> {
        let ids = self.store.country_ids().await?;
        let mut codes: Vec<String> = ids.keys().cloned().collect();
        codes.sort();

        let mut inserted = 0;
        for origins in chunk(&codes, self.chunks) {
            let items = self.source.population(origins, &codes).await?;
            info!(
                "Loading {} population items for {} origins",
                items.len(),
                origins.len()
            );

            for item in items {
                let (Some(origin), Some(arrival)) = (ids.get(&item.coo_iso), ids.get(&item.coa_iso))
                else {
                    warn!(
                        "Skipping population {} -> {} ({}): unknown country",
                        item.coo_iso, item.coa_iso, item.year
                    );
                    continue;
                };

                for (category, number) in item.figures() {
                    let population = NewPopulation {
                        number,
                        year: item.year,
                        category,
                        country_id: *origin,
                        country_arrival_id: *arrival,
                    };
                    match self.store.insert_population_if_absent(&population).await {
                        Ok(true) => inserted += 1,
                        Ok(false) => {}
                        Err(e) => warn!(
                            "Skipping population {} -> {} ({}, {}): {}",
                            item.coo_iso, item.coa_iso, item.year, category, e
                        ),
                    }
                }
            }
        }

        info!("Inserted {} population rows", inserted);
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UnhcrPopulation;
    use crate::testing::{FakeSource, MemoryStore};
    use common::DisplacedCategory;

    fn codes(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("C{:02}", i)).collect()
    }

    fn unhcr_country(major_area: &str, region: &str, name: &str, iso: &str, iso2: &str) -> UnhcrCountry {
        UnhcrCountry {
            major_area: major_area.to_string(),
            region: region.to_string(),
            name: name.to_string(),
            iso: iso.to_string(),
            iso2: iso2.to_string(),
        }
    }

    #[test]
    fn test_is_official_alpha_2() {
        assert!(is_official_alpha_2("UA"));
        assert!(is_official_alpha_2("SS"));
        assert!(is_official_alpha_2("ua"));
        assert!(!is_official_alpha_2("QZ"));
        assert!(!is_official_alpha_2(""));
    }

    #[test]
    fn test_chunk() {
        let sizes = |n, parts| {
            chunk(&codes(n), parts)
                .iter()
                .map(|c| c.len())
                .collect::<Vec<_>>()
        };

        assert_eq!(sizes(8, 4), vec![2, 2, 2, 2]);
        assert_eq!(sizes(11, 4), vec![2, 2, 2, 2, 3]);
        assert_eq!(sizes(3, 4), vec![3]);
        assert_eq!(sizes(5, 0), vec![5]);
        assert_eq!(chunk(&codes(11), 4).concat(), codes(11));
    }

    #[tokio::test]
    async fn test_geo_loader() {
        let source = FakeSource {
            countries: vec![
                unhcr_country("Africa", "Eastern Africa", "Kenya", "KEN", "KE"),
                unhcr_country("Africa", "Eastern Africa", "Kenya", "KEN", "KE"),
                unhcr_country("", "", "Atlantis", "ATL", "QZ"),
                unhcr_country("", "", "Stateless", "XXA", ""),
            ],
            ..Default::default()
        };
        let store = MemoryStore::default();

        let created = GeoLoader::new(&source, &store).load().await.unwrap();

        assert_eq!(created, 3);
        let countries = store.countries();
        assert_eq!(countries[0].iso_2.as_deref(), Some("KE"));
        assert!(countries[0].is_recognized);
        assert!(!countries[1].is_recognized);
        assert_eq!(countries[2].iso_2, None);
        assert!(!countries[2].is_recognized);
        assert_eq!(store.continents(), vec!["Africa", "NA"]);
        assert_eq!(store.regions(), vec!["Eastern Africa", "NA"]);
    }

    #[tokio::test]
    async fn test_geo_loader_skips_conflicting_countries() {
        let source = FakeSource {
            countries: vec![
                unhcr_country("Africa", "Eastern Africa", "Kenya", "KEN", "KE"),
                unhcr_country("Africa", "Eastern Africa", "Kenia", "KEN", "KE"),
                unhcr_country("Africa", "Eastern Africa", "Uganda", "UGA", "UG"),
            ],
            ..Default::default()
        };
        let store = MemoryStore::default();

        let created = GeoLoader::new(&source, &store).load().await.unwrap();

        assert_eq!(created, 2);
        assert_eq!(store.countries()[1].name, "Uganda");
    }

    #[tokio::test]
    async fn test_population_loader() {
        let store = MemoryStore::with_countries(&["KEN", "SOM", "UGA"]);
        let source = FakeSource {
            population: vec![
                UnhcrPopulation {
                    year: 2023,
                    coo_iso: "SOM".to_string(),
                    coa_iso: "KEN".to_string(),
                    refugees: 100,
                    asylum_seekers: 10,
                    oip: 1,
                    idps: 0,
                    ooc: 4,
                    stateless: 2,
                },
                UnhcrPopulation {
                    year: 2023,
                    coo_iso: "SOM".to_string(),
                    coa_iso: "ATL".to_string(),
                    refugees: 7,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let loader = PopulationLoader::new(&source, &store, 1);
        assert_eq!(loader.load().await.unwrap(), 4);
        assert_eq!(loader.load().await.unwrap(), 0);

        let rows = store.population();
        assert_eq!(rows.len(), 4);
        assert_eq!(
            rows.iter()
                .map(|row| (row.category, row.number))
                .collect::<Vec<_>>(),
            vec![
                (DisplacedCategory::Refugees, 100),
                (DisplacedCategory::AsyliumSeekers, 11),
                (DisplacedCategory::InternallyDisplaced, 0),
                (DisplacedCategory::PeopleOfConcerns, 6),
            ]
        );

        assert_eq!(
            source.requests(),
            vec![
                "KEN,SOM,UGA -> KEN,SOM,UGA",
                "KEN,SOM,UGA -> KEN,SOM,UGA",
            ]
        );
    }

    #[tokio::test]
    async fn test_population_loader_skips_rows_that_fail() {
        let mut store = MemoryStore::with_countries(&["KEN", "SOM"]);
        store.failing_year = Some(1999);
        let item = |year| UnhcrPopulation {
            year,
            coo_iso: "SOM".to_string(),
            coa_iso: "KEN".to_string(),
            refugees: 5,
            ..Default::default()
        };
        let source = FakeSource {
            population: vec![item(1999), item(2000)],
            ..Default::default()
        };

        let inserted = PopulationLoader::new(&source, &store, 1).load().await.unwrap();

        assert_eq!(inserted, 4);
        assert!(store.population().iter().all(|row| row.year == 2000));
    }
}
