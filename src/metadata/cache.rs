//! Session-lifetime metadata cache with request coalescing.
//!
//! The cache is the only shared mutable resource in the engine. Each key
//! holds a `tokio::sync::OnceCell`; concurrent callers for the same uncached
//! key attach to the single in-flight initialization instead of issuing
//! duplicate fetches, so rapid UI interaction costs at most one network call
//! per key. Failures are not cached; the next caller retries. No expiry
//! within a session.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use super::provider::{MetadataProvider, MetadataResult};
use super::types::{EntityMetadata, LookupAttribute};

type EntityCell = Arc<OnceCell<EntityMetadata>>;
type LookupCell = Arc<OnceCell<Option<LookupAttribute>>>;

/// Memoizing wrapper around a [`MetadataProvider`].
pub struct MetadataCache {
    provider: Arc<dyn MetadataProvider>,
    // Locks guard only the map itself and are never held across an await;
    // the per-key cell serializes the actual fetch.
    entities: Mutex<HashMap<String, EntityCell>>,
    lookups: Mutex<HashMap<(String, String), LookupCell>>,
}

impl MetadataCache {
    /// Create a cache over the given provider.
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self {
            provider,
            entities: Mutex::new(HashMap::new()),
            lookups: Mutex::new(HashMap::new()),
        }
    }

    /// Number of entity descriptors currently cached. Surfaced in the
    /// debugging panel.
    pub fn cached_entity_count(&self) -> usize {
        self.entities
            .lock()
            .expect("metadata cache lock poisoned")
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    fn entity_cell(&self, logical_name: &str) -> EntityCell {
        let mut entities = self.entities.lock().expect("metadata cache lock poisoned");
        entities
            .entry(logical_name.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    fn lookup_cell(&self, entity: &str, attribute: &str) -> LookupCell {
        let mut lookups = self.lookups.lock().expect("metadata cache lock poisoned");
        lookups
            .entry((entity.to_string(), attribute.to_string()))
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }
}

#[async_trait]
impl MetadataProvider for MetadataCache {
    async fn entity_metadata(&self, logical_name: &str) -> MetadataResult<EntityMetadata> {
        let cell = self.entity_cell(logical_name);
        let metadata = cell
            .get_or_try_init(|| async {
                debug!(entity = logical_name, "metadata cache miss, fetching");
                self.provider.entity_metadata(logical_name).await
            })
            .await?;
        Ok(metadata.clone())
    }

    async fn lookup_attribute(
        &self,
        entity: &str,
        attribute: &str,
    ) -> MetadataResult<Option<LookupAttribute>> {
        let cell = self.lookup_cell(entity, attribute);
        let lookup = cell
            .get_or_try_init(|| async {
                debug!(entity, attribute, "lookup metadata cache miss, fetching");
                self.provider.lookup_attribute(entity, attribute).await
            })
            .await?;
        Ok(lookup.clone())
    }
}
