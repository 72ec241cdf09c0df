//! Generic caching layer for remote listings and offline support.
//!
//! This module provides a collection-agnostic caching mechanism that:
//! - Caches whole listings (ordered entries plus total count) per query
//! - Serves fresh cache directly and stale cache when the network is down
//! - Patches cached listings after bulk deletions instead of refetching

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::ListingStorage;
pub use traits::{CacheResult, CacheSource, Cacheable, QueryKey};
