//! In-memory source and store for loader and job tests

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use crate::database::SyncStore;
use crate::models::{NewCountry, NewPopulation, UnhcrCountry, UnhcrPopulation};
use crate::unhcr::PopulationSource;

#[derive(Default)]
pub struct FakeSource {
    pub countries: Vec<UnhcrCountry>,
    /// Answered for the origins a request asks for
    pub population: Vec<UnhcrPopulation>,
    /// Number of `countries` calls that fail before the source recovers
    pub failures: AtomicUsize,
    pub requests: Mutex<Vec<String>>,
}

impl FakeSource {
    /// Population requests as `origins -> arrivals`
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PopulationSource for FakeSource {
    async fn countries(&self) -> Result<Vec<UnhcrCountry>> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            bail!("UNHCR unavailable");
        }
        Ok(self.countries.clone())
    }

    async fn population(
        &self,
        origins: &[String],
        arrivals: &[String],
    ) -> Result<Vec<UnhcrPopulation>> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("{} -> {}", origins.join(","), arrivals.join(",")));
        Ok(self
            .population
            .iter()
            .filter(|item| origins.contains(&item.coo_iso))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct Tables {
    continents: Vec<(Uuid, String)>,
    regions: Vec<(Uuid, String)>,
    countries: Vec<(Uuid, NewCountry)>,
    population: Vec<NewPopulation>,
}

/// Enforces the same uniqueness rules as the database
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    /// Population inserts for this year fail
    pub failing_year: Option<i32>,
}

impl MemoryStore {
    /// Recognized countries with the given ISO-3 codes
    pub fn with_countries(isos: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut tables = store.tables.lock().unwrap();
            for iso in isos {
                tables.countries.push((
                    Uuid::new_v4(),
                    NewCountry {
                        name: iso.to_string(),
                        iso: iso.to_string(),
                        iso_2: None,
                        is_recognized: true,
                        region_id: Uuid::new_v4(),
                    },
                ));
            }
        }
        store
    }

    pub fn continents(&self) -> Vec<String> {
        let tables = self.tables.lock().unwrap();
        tables.continents.iter().map(|(_, name)| name.clone()).collect()
    }

    pub fn regions(&self) -> Vec<String> {
        let tables = self.tables.lock().unwrap();
        tables.regions.iter().map(|(_, name)| name.clone()).collect()
    }

    pub fn countries(&self) -> Vec<NewCountry> {
        let tables = self.tables.lock().unwrap();
        tables.countries.iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn population(&self) -> Vec<NewPopulation> {
        self.tables.lock().unwrap().population.clone()
    }
}

fn find_or_insert(rows: &mut Vec<(Uuid, String)>, name: &str) -> Uuid {
    if let Some((id, _)) = rows.iter().find(|(_, existing)| existing == name) {
        return *id;
    }
    let id = Uuid::new_v4();
    rows.push((id, name.to_string()));
    id
}

#[async_trait]
impl SyncStore for MemoryStore {
    async fn continent_id(&self, name: &str) -> Result<Uuid> {
        Ok(find_or_insert(&mut self.tables.lock().unwrap().continents, name))
    }

    async fn region_id(&self, name: &str, _continent_id: Uuid) -> Result<Uuid> {
        Ok(find_or_insert(&mut self.tables.lock().unwrap().regions, name))
    }

    async fn insert_country_if_absent(&self, country: &NewCountry) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        if tables.countries.iter().any(|(_, c)| c.name == country.name) {
            return Ok(false);
        }
        if tables.countries.iter().any(|(_, c)| {
            c.iso == country.iso || (c.iso_2.is_some() && c.iso_2 == country.iso_2)
        }) {
            bail!("duplicate key value violates unique constraint");
        }
        tables.countries.push((Uuid::new_v4(), country.clone()));
        Ok(true)
    }

    async fn country_ids(&self) -> Result<HashMap<String, Uuid>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .countries
            .iter()
            .map(|(id, c)| (c.iso.clone(), *id))
            .collect())
    }

    async fn insert_population_if_absent(&self, population: &NewPopulation) -> Result<bool> {
        if self.failing_year == Some(population.year) {
            bail!("insert or update on table \"population\" violates foreign key constraint");
        }
        let mut tables = self.tables.lock().unwrap();
        if tables.population.iter().any(|row| {
            row.year == population.year
                && row.country_id == population.country_id
                && row.country_arrival_id == population.country_arrival_id
                && row.category == population.category
        }) {
            return Ok(false);
        }
        tables.population.push(population.clone());
        Ok(true)
    }
}
