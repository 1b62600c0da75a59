use crate::domain::model::{RawRegistryRecord, RegistryResponse};
use crate::domain::ports::{ConfigProvider, RegistryLookup};
use crate::utils::error::{ResolverError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_REGISTRY_ENDPOINT: &str = "https://epsg.io/";

/// Search client for an epsg.io compatible registry.
#[derive(Debug, Clone)]
pub struct EpsgIoRegistry {
    client: Client,
    endpoint: String,
}

impl EpsgIoRegistry {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(
            config.registry_endpoint(),
            Duration::from_secs(config.timeout_seconds()),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RegistryLookup for EpsgIoRegistry {
    async fn lookup(&self, hint: &str) -> Result<Vec<RawRegistryRecord>> {
        tracing::debug!("Querying registry {} with q='{}'", self.endpoint, hint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("format", "json"), ("q", hint)])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Registry response status: {}", status);
        if !status.is_success() {
            return Err(ResolverError::RegistryStatusError {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let body = response.text().await?;
        let parsed: RegistryResponse = serde_json::from_str(&body)?;
        tracing::debug!("Registry returned {} candidates", parsed.results.len());

        Ok(parsed
            .results
            .into_iter()
            .map(RawRegistryRecord::from_value)
            .collect())
    }
}
