//! Engine facade.
//!
//! [`DiscoveryEngine`] owns the Web API client and the metadata cache with
//! one explicit lifecycle: construct at session start, drop at process exit.
//! It wires the harness-facing operations together: entity metadata,
//! relationship discovery over a live sample, record normalization, and the
//! child-record feed for the navigation UI.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiError, DataClient, QueryOptions};
use crate::config::Settings;
use crate::inference::{discover_relationships, pluralize, DiscoveredRelationship};
use crate::metadata::{
    EntityMetadata, MetadataCache, MetadataError, MetadataProvider, WebApiMetadataProvider,
};
use crate::records::{NamePolicy, NormalizeError, NormalizedRecord, RawRecord, RecordNormalizer};

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Umbrella error for the engine facade.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Session-scoped discovery engine.
pub struct DiscoveryEngine {
    client: Arc<DataClient>,
    cache: Arc<MetadataCache>,
    sample_size: u32,
}

impl DiscoveryEngine {
    /// Build an engine from settings.
    pub fn new(settings: &Settings) -> EngineResult<Self> {
        let client = Arc::new(DataClient::new(&settings.service)?);
        Ok(Self::with_client(client, settings.discovery.sample_size))
    }

    /// Build an engine over an existing client.
    pub fn with_client(client: Arc<DataClient>, sample_size: u32) -> Self {
        let provider = Arc::new(WebApiMetadataProvider::new(client.clone()));
        let cache = Arc::new(MetadataCache::new(provider));
        Self {
            client,
            cache,
            sample_size,
        }
    }

    /// The metadata cache, shared with callers that classify columns
    /// themselves.
    pub fn metadata_cache(&self) -> Arc<MetadataCache> {
        self.cache.clone()
    }

    /// Cached-or-fetched schema metadata for an entity.
    pub async fn entity_metadata(&self, logical_name: &str) -> EngineResult<EntityMetadata> {
        Ok(self.cache.entity_metadata(logical_name).await?)
    }

    /// The collection route for an entity: metadata-declared when available,
    /// otherwise a pluralized guess (flagged in the log).
    pub async fn collection_name(&self, logical_name: &str) -> String {
        match self.cache.entity_metadata(logical_name).await {
            Ok(metadata) => metadata.collection_name,
            Err(err) => {
                let guess = pluralize(logical_name);
                warn!(entity = logical_name, error = %err,
                    "metadata unavailable, guessing collection route '{guess}'");
                guess
            }
        }
    }

    /// Fetch a record sample and discover relationship edges for an entity.
    pub async fn discover(&self, entity: &str) -> EngineResult<Vec<DiscoveredRelationship>> {
        let metadata = self.cache.entity_metadata(entity).await?;
        let sample = self
            .client
            .query_records(&metadata.collection_name, &QueryOptions::sample(self.sample_size))
            .await?;
        let edges = self.discover_in(&sample, entity).await?;
        info!(entity, edges = edges.len(), "discovered relationships");
        Ok(edges)
    }

    /// Discover relationship edges in records the caller already holds.
    pub async fn discover_in(
        &self,
        records: &[RawRecord],
        entity: &str,
    ) -> EngineResult<Vec<DiscoveredRelationship>> {
        Ok(discover_relationships(records, entity, self.cache.as_ref()).await?)
    }

    /// Fetch and normalize a page of records for an entity.
    pub async fn normalized_records(
        &self,
        entity: &str,
        options: &QueryOptions,
        policy: NamePolicy,
    ) -> EngineResult<BTreeMap<String, NormalizedRecord>> {
        let metadata = self.cache.entity_metadata(entity).await?;
        let records = self
            .client
            .query_records(&metadata.collection_name, options)
            .await?;
        let normalizer = RecordNormalizer::new(entity, Some(metadata)).with_policy(policy);
        Ok(normalizer.normalize(&records)?)
    }

    /// The flat list-of-children feed: child records referencing a parent
    /// record through a discovered relationship edge.
    pub async fn children_of(
        &self,
        relationship: &DiscoveredRelationship,
        parent_record_id: &str,
        top: u32,
    ) -> EngineResult<BTreeMap<String, NormalizedRecord>> {
        let options = QueryOptions {
            filter: Some(format!(
                "{} eq {parent_record_id}",
                relationship.lookup_column
            )),
            top: Some(top),
            ..QueryOptions::default()
        };
        self.normalized_records(&relationship.child_entity, &options, NamePolicy::Strict)
            .await
    }
}
