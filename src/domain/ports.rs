use crate::domain::model::RawRegistryRecord;
use crate::utils::error::Result;
use async_trait::async_trait;

/// A CRS registry that can be searched by free text or code.
#[async_trait]
pub trait RegistryLookup: Send + Sync {
    /// Candidates in registry order. Failures are network or body-parse errors.
    async fn lookup(&self, hint: &str) -> Result<Vec<RawRegistryRecord>>;
}

pub trait ConfigProvider: Send + Sync {
    fn registry_endpoint(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn default_hint(&self) -> &str;
    /// Projection id used when a search yields nothing usable.
    fn fallback_projection(&self) -> &str;
    fn home_center(&self) -> [f64; 2];
    fn home_zoom(&self) -> f64;
}
