//! Cache layer that orchestrates listing caching with network fetching.

use chrono::{Duration, Utc};
use color_eyre::Result;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::storage::ListingStorage;
use super::traits::{CacheResult, Cacheable, QueryKey};
use crate::listing::{DeletionSet, Listing, Reconciled};

/// Cache layer that manages caching logic and network fetching.
///
/// This layer sits between the application and the API client, providing
/// transparent caching with offline support.
#[derive(Clone)]
pub struct CacheLayer {
  storage: Arc<ListingStorage>,
  /// How long before cached data is considered stale
  stale_time: Duration,
}

impl CacheLayer {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: ListingStorage) -> Self {
    Self {
      storage: Arc::new(storage),
      stale_time: Duration::minutes(5),
    }
  }

  /// Set the stale time for cached data.
  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  /// Check if cached data is stale based on cached_at timestamp.
  fn is_stale(&self, cached_at: chrono::DateTime<Utc>) -> bool {
    Utc::now() - cached_at > self.stale_time
  }

  /// Fetch a listing with cache-first strategy.
  ///
  /// 1. Check cache - if fresh, return immediately
  /// 2. If stale/missing, fetch from network
  /// 3. On network failure, return stale cache (offline mode)
  /// 4. Update cache with new data
  pub async fn fetch_list<T, K, F, Fut>(
    &self,
    key: &K,
    fetcher: F,
  ) -> Result<CacheResult<Listing<T>>>
  where
    T: Cacheable,
    K: QueryKey,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Listing<T>>>,
  {
    let hash = key.cache_hash();

    if let Some(cached) = self.storage.get_listing::<T>(&hash)? {
      if !self.is_stale(cached.cached_at) {
        return Ok(CacheResult::from_cache(cached.listing, cached.cached_at));
      }

      match fetcher().await {
        Ok(listing) => {
          self
            .storage
            .store_listing(&hash, &key.description(), &listing)?;
          Ok(CacheResult::from_network(listing))
        }
        Err(e) => {
          warn!(query = %key.description(), error = %e, "serving stale listing");
          Ok(CacheResult::offline(cached.listing, cached.cached_at))
        }
      }
    } else {
      // No cache, must fetch from network
      let listing = fetcher().await?;
      self
        .storage
        .store_listing(&hash, &key.description(), &listing)?;
      Ok(CacheResult::from_network(listing))
    }
  }

  /// Remove deleted entries from a cached listing in place.
  ///
  /// Returns `None` when nothing is cached for `key`.
  pub fn apply_deletions<T, K>(
    &self,
    key: &K,
    deletions: DeletionSet,
  ) -> Result<Option<Reconciled<T>>>
  where
    T: Cacheable,
    K: QueryKey,
  {
    let hash = key.cache_hash();
    let Some(cached) = self.storage.get_listing::<T>(&hash)? else {
      debug!(query = %key.description(), "no cached listing to reconcile");
      return Ok(None);
    };

    let reconciled = cached.listing.reconcile(deletions);
    if reconciled.removed > 0 {
      self.storage.update_listing(&hash, &reconciled.listing)?;
    }
    debug!(
      query = %key.description(),
      removed = reconciled.removed,
      total = reconciled.listing.total,
      "reconciled cached listing"
    );
    Ok(Some(reconciled))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::CacheSource;
  use crate::db::Database;
  use crate::listing::Identified;
  use color_eyre::eyre::eyre;
  use serde::{Deserialize, Serialize};

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Tag {
    id: i64,
    name: String,
  }

  impl Identified for Tag {
    fn id(&self) -> i64 {
      self.id
    }
  }

  impl Cacheable for Tag {
    fn entity_type() -> &'static str {
      "tag"
    }
  }

  struct TagsKey;

  impl QueryKey for TagsKey {
    fn cache_hash(&self) -> String {
      "tags".to_string()
    }

    fn description(&self) -> String {
      "all tags".to_string()
    }
  }

  fn tags(ids: &[i64]) -> Listing<Tag> {
    let entries: Vec<Tag> = ids
      .iter()
      .map(|&id| Tag {
        id,
        name: format!("tag-{}", id),
      })
      .collect();
    Listing::new(entries, ids.len() + 10)
  }

  fn layer() -> CacheLayer {
    CacheLayer::new(ListingStorage::new(Database::open_in_memory().unwrap()))
  }

  #[tokio::test]
  async fn test_fresh_cache_skips_network() {
    let cache = layer();
    cache
      .fetch_list(&TagsKey, || async { Ok(tags(&[1, 2])) })
      .await
      .unwrap();

    let result = cache
      .fetch_list::<Tag, _, _, _>(&TagsKey, || async { Err(eyre!("should not be called")) })
      .await
      .unwrap();
    assert_eq!(result.source, CacheSource::CacheFresh);
    assert_eq!(result.data, tags(&[1, 2]));
  }

  #[tokio::test]
  async fn test_stale_cache_served_when_offline() {
    let cache = layer().with_stale_time(Duration::seconds(-1));
    cache
      .fetch_list(&TagsKey, || async { Ok(tags(&[3])) })
      .await
      .unwrap();

    let result = cache
      .fetch_list::<Tag, _, _, _>(&TagsKey, || async { Err(eyre!("connection refused")) })
      .await
      .unwrap();
    assert_eq!(result.source, CacheSource::Offline);
    assert_eq!(result.data, tags(&[3]));
  }

  #[tokio::test]
  async fn test_missing_cache_propagates_network_error() {
    let result = layer()
      .fetch_list::<Tag, _, _, _>(&TagsKey, || async { Err(eyre!("connection refused")) })
      .await;
    assert!(result.is_err());
  }

  #[tokio::test]
  async fn test_apply_deletions_patches_cached_listing() {
    let cache = layer();
    cache
      .fetch_list(&TagsKey, || async { Ok(tags(&[1, 2, 3])) })
      .await
      .unwrap();

    let reconciled = cache
      .apply_deletions::<Tag, _>(&TagsKey, DeletionSet::from(vec![2, 40]))
      .unwrap()
      .unwrap();
    assert_eq!(reconciled.removed, 1);

    let cached = cache
      .fetch_list::<Tag, _, _, _>(&TagsKey, || async { Err(eyre!("offline")) })
      .await
      .unwrap();
    let ids: Vec<i64> = cached.data.entries.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(cached.data.total, 12);
  }

  #[test]
  fn test_apply_deletions_without_cache() {
    let reconciled = layer()
      .apply_deletions::<Tag, _>(&TagsKey, DeletionSet::from(vec![1]))
      .unwrap();
    assert!(reconciled.is_none());
  }
}
