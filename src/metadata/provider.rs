//! MetadataProvider trait definition.
//!
//! The MetadataProvider trait abstracts over where schema metadata comes
//! from. The primary implementation fetches from the data service's Web API;
//! tests substitute in-memory fixtures. The [`super::MetadataCache`] also
//! implements the trait, so cached and uncached sources are interchangeable
//! to the discovery engine.

use async_trait::async_trait;
use thiserror::Error;

use super::types::{EntityMetadata, LookupAttribute};
use crate::api::ApiError;

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors that can occur while fetching schema metadata.
///
/// Fatal to any operation requiring that entity's schema; surfaced to the
/// caller and not retried internally.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// The metadata endpoint was unreachable or returned non-success.
    #[error("metadata fetch for '{entity}' failed: {source}")]
    Fetch {
        entity: String,
        #[source]
        source: ApiError,
    },

    /// The definition body was missing a required field.
    #[error("metadata for '{entity}' is malformed: missing or empty {missing}")]
    Malformed {
        entity: String,
        missing: &'static str,
    },
}

impl MetadataError {
    /// Wrap an API failure for an entity fetch.
    pub fn fetch(entity: impl Into<String>, source: ApiError) -> Self {
        Self::Fetch {
            entity: entity.into(),
            source,
        }
    }

    /// Whether retrying the fetch may succeed without intervention.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Fetch { source, .. } if source.is_retriable())
    }
}

/// Trait for fetching schema metadata.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch the schema descriptor for an entity logical name.
    async fn entity_metadata(&self, logical_name: &str) -> MetadataResult<EntityMetadata>;

    /// Fetch lookup target metadata for one attribute of an entity.
    ///
    /// Returns `Ok(None)` when the source authoritatively says the attribute
    /// is not a lookup. `Ok(Some)` with empty targets means the lookup is
    /// polymorphic with an open target set; the two states are distinct.
    async fn lookup_attribute(
        &self,
        entity: &str,
        attribute: &str,
    ) -> MetadataResult<Option<LookupAttribute>>;
}
