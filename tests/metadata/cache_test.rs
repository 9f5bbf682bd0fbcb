//! Integration tests for the metadata cache.
//!
//! Pins the session-cache contract: one fetch per key across sequential and
//! concurrent callers, failures not cached, lookup metadata keyed per
//! attribute.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use periscope::metadata::{
    EntityMetadata, LookupAttribute, MetadataCache, MetadataError, MetadataProvider,
    MetadataResult,
};

/// Provider that counts fetches and can fail the first N of them.
struct CountingProvider {
    entity_fetches: AtomicUsize,
    lookup_fetches: AtomicUsize,
    fail_first: usize,
    delay: Duration,
}

impl CountingProvider {
    fn new() -> Self {
        Self {
            entity_fetches: AtomicUsize::new(0),
            lookup_fetches: AtomicUsize::new(0),
            fail_first: 0,
            delay: Duration::ZERO,
        }
    }

    fn failing_first(count: usize) -> Self {
        Self {
            fail_first: count,
            ..Self::new()
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new()
        }
    }

    fn metadata(logical_name: &str) -> EntityMetadata {
        EntityMetadata {
            logical_name: logical_name.to_string(),
            primary_id_attribute: format!("{logical_name}id"),
            primary_name_attribute: "pum_name".to_string(),
            collection_name: format!("{logical_name}s"),
            display_name: None,
        }
    }
}

#[async_trait]
impl MetadataProvider for CountingProvider {
    async fn entity_metadata(&self, logical_name: &str) -> MetadataResult<EntityMetadata> {
        let fetch = self.entity_fetches.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if fetch < self.fail_first {
            return Err(MetadataError::Malformed {
                entity: logical_name.to_string(),
                missing: "PrimaryIdAttribute",
            });
        }
        Ok(Self::metadata(logical_name))
    }

    async fn lookup_attribute(
        &self,
        _entity: &str,
        attribute: &str,
    ) -> MetadataResult<Option<LookupAttribute>> {
        self.lookup_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(Some(LookupAttribute::new(attribute, vec!["pum_portfolio".to_string()])))
    }
}

#[tokio::test]
async fn test_second_call_is_served_from_cache() {
    let provider = Arc::new(CountingProvider::new());
    let cache = MetadataCache::new(provider.clone());

    let first = cache.entity_metadata("pum_initiative").await.unwrap();
    let second = cache.entity_metadata("pum_initiative").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(provider.entity_fetches.load(Ordering::SeqCst), 1);
    assert_eq!(cache.cached_entity_count(), 1);
}

#[tokio::test]
async fn test_distinct_keys_fetch_separately() {
    let provider = Arc::new(CountingProvider::new());
    let cache = MetadataCache::new(provider.clone());

    cache.entity_metadata("pum_initiative").await.unwrap();
    cache.entity_metadata("pum_portfolio").await.unwrap();

    assert_eq!(provider.entity_fetches.load(Ordering::SeqCst), 2);
    assert_eq!(cache.cached_entity_count(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_coalesce_into_one_fetch() {
    let provider = Arc::new(CountingProvider::slow(Duration::from_millis(25)));
    let cache = Arc::new(MetadataCache::new(provider.clone()));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            cache.entity_metadata("pum_initiative").await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    assert_eq!(
        provider.entity_fetches.load(Ordering::SeqCst),
        1,
        "late callers must attach to the in-flight fetch"
    );
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let provider = Arc::new(CountingProvider::failing_first(1));
    let cache = MetadataCache::new(provider.clone());

    assert!(cache.entity_metadata("pum_initiative").await.is_err());
    assert_eq!(cache.cached_entity_count(), 0);

    // The next caller retries and succeeds.
    assert!(cache.entity_metadata("pum_initiative").await.is_ok());
    assert_eq!(provider.entity_fetches.load(Ordering::SeqCst), 2);
    assert_eq!(cache.cached_entity_count(), 1);
}

#[tokio::test]
async fn test_lookup_attributes_cache_per_attribute() {
    let provider = Arc::new(CountingProvider::new());
    let cache = MetadataCache::new(provider.clone());

    cache
        .lookup_attribute("pum_initiative", "pum_portfolio")
        .await
        .unwrap();
    cache
        .lookup_attribute("pum_initiative", "pum_portfolio")
        .await
        .unwrap();
    cache
        .lookup_attribute("pum_initiative", "pum_program")
        .await
        .unwrap();

    assert_eq!(provider.lookup_fetches.load(Ordering::SeqCst), 2);
}
