//! WebApiMetadataProvider implementation.
//!
//! The primary MetadataProvider implementation: fetches entity definitions
//! and lookup attribute metadata through a shared [`DataClient`].

use std::sync::Arc;

use async_trait::async_trait;

use super::provider::{MetadataError, MetadataProvider, MetadataResult};
use super::types::{EntityMetadata, LookupAttribute};
use crate::api::{ApiError, DataClient};

/// MetadataProvider over the data service Web API.
pub struct WebApiMetadataProvider {
    client: Arc<DataClient>,
}

impl WebApiMetadataProvider {
    /// Create a provider over a shared client.
    pub fn new(client: Arc<DataClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetadataProvider for WebApiMetadataProvider {
    async fn entity_metadata(&self, logical_name: &str) -> MetadataResult<EntityMetadata> {
        let body = self
            .client
            .entity_definition(logical_name)
            .await
            .map_err(|err| MetadataError::fetch(logical_name, err))?;
        EntityMetadata::from_definition(&body, logical_name)
    }

    async fn lookup_attribute(
        &self,
        entity: &str,
        attribute: &str,
    ) -> MetadataResult<Option<LookupAttribute>> {
        match self.client.lookup_attribute_targets(entity, attribute).await {
            Ok(body) => Ok(Some(LookupAttribute::from_attribute_body(&body, attribute)?)),
            // The attribute endpoint 404s when the attribute is not a lookup.
            Err(ApiError::Service(report)) if report.status_code == 404 => Ok(None),
            Err(err) => Err(MetadataError::fetch(entity, err)),
        }
    }
}
