//! UNHCR population API client

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::config::SyncConfig;
use crate::models::{UnhcrCountry, UnhcrPage, UnhcrPopulation};

/// Large enough for the API to answer in a single page
const PAGE_LIMIT: u64 = 90_000_000_000;

/// Where countries and population figures come from
#[async_trait]
pub trait PopulationSource: Send + Sync {
    async fn countries(&self) -> Result<Vec<UnhcrCountry>>;

    /// Figures from any of `origins` to any of `arrivals`, by ISO-3 code
    async fn population(
        &self,
        origins: &[String],
        arrivals: &[String],
    ) -> Result<Vec<UnhcrPopulation>>;
}

#[derive(Clone)]
pub struct UnhcrClient {
    client: Client,
    base_url: String,
}

impl UnhcrClient {
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("livedisplaced-sync/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn items<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let page: UnhcrPage<T> = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(page.items)
    }

    fn countries_url(&self) -> String {
        format!("{}/countries/?limit={}", self.base_url, PAGE_LIMIT)
    }

    fn population_url(&self, origins: &[String], arrivals: &[String]) -> String {
        format!(
            "{}/population/?limit={}&coo={}&coa={}",
            self.base_url,
            PAGE_LIMIT,
            origins.join(","),
            arrivals.join(",")
        )
    }
}

#[async_trait]
impl PopulationSource for UnhcrClient {
    async fn countries(&self) -> Result<Vec<UnhcrCountry>> {
        info!("Fetching UNHCR countries");
        self.items(&self.countries_url()).await
    }

    async fn population(
        &self,
        origins: &[String],
        arrivals: &[String],
    ) -> Result<Vec<UnhcrPopulation>> {
        info!("Fetching UNHCR population for {} origins", origins.len());
        self.items(&self.population_url(origins, arrivals)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> UnhcrClient {
        UnhcrClient::new(&SyncConfig {
            schedule: "0 0 3 * * *".to_string(),
            base_url: "https://api.unhcr.org/population/v1/".to_string(),
            population_chunks: 4,
            request_timeout: 30,
            run_on_start: false,
        })
        .unwrap()
    }

    #[test]
    fn test_urls() {
        let client = client();

        assert_eq!(
            client.countries_url(),
            "https://api.unhcr.org/population/v1/countries/?limit=90000000000"
        );
        assert_eq!(
            client.population_url(
                &["UKR".to_string(), "SYR".to_string()],
                &["POL".to_string()]
            ),
            "https://api.unhcr.org/population/v1/population/?limit=90000000000&coo=UKR,SYR&coa=POL"
        );
    }
}
