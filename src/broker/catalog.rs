use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{BrokerCredentials, CatalogSource};
use crate::controller::CatalogService;
use crate::error::CatalogError;

// Only the ids matter here; everything else in the catalog is ignored.
#[derive(Debug, Deserialize)]
struct CatalogResponse {
    services: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: String,
}

/// Reads `GET {broker_url}/v2/catalog` with HTTP basic auth.
pub struct HttpCatalog {
    client: Client,
}

impl HttpCatalog {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

pub fn catalog_url(broker_url: &str) -> String {
    format!("{}/v2/catalog", broker_url.trim_end_matches('/'))
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn service_ids(
        &self,
        broker_url: &str,
        credentials: &BrokerCredentials,
    ) -> Result<Vec<String>, CatalogError> {
        let url = catalog_url(broker_url);
        tracing::debug!("Fetching broker catalog from {url}");

        let resp = self
            .client
            .get(&url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .header("X-Broker-Api-Version", "2.0")
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(CatalogError::Status { status, body });
        }

        let catalog: CatalogResponse = serde_json::from_str(&body)?;
        let ids: Vec<String> = catalog.services.into_iter().map(|s| s.id).collect();
        tracing::debug!("Broker catalog advertises {} service(s)", ids.len());
        Ok(ids)
    }
}

/// Keep the known services whose broker-assigned id is advertised in the
/// catalog. Control-plane order is preserved.
pub fn services_in_catalog(known: Vec<CatalogService>, ids: &[String]) -> Vec<CatalogService> {
    let ids: HashSet<&str> = ids.iter().map(String::as_str).collect();
    known
        .into_iter()
        .filter(|s| ids.contains(s.unique_id.as_str()))
        .collect()
}
