//! Core traits and types for the listing cache.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::listing::Identified;

/// Trait for entities that can be cached in listings.
pub trait Cacheable: Identified + Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Entity type name for storage organization (e.g., "archive_service")
  fn entity_type() -> &'static str;
}

/// Identifies a cached listing.
pub trait QueryKey {
  /// Stable, fixed-length key used for storage lookup
  fn cache_hash(&self) -> String;

  /// Human readable description stored next to the entry
  fn description(&self) -> String;
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was cached (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// Create a new cache result from fresh cached data.
  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::CacheFresh,
      cached_at: Some(cached_at),
    }
  }

  /// Create a new cache result for offline mode.
  pub fn offline(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Offline,
      cached_at: Some(cached_at),
    }
  }
}

/// Indicates where cached data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from network
  Network,
  /// Data from cache, still considered fresh
  CacheFresh,
  /// Offline mode - network unavailable, serving stale cached data
  Offline,
}
