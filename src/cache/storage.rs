//! Listing cache storage on top of the shared SQLite database.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, OptionalExtension};

use super::traits::Cacheable;
use crate::db::{parse_datetime, Database};
use crate::listing::Listing;

/// A cached listing.
#[derive(Debug, Clone)]
pub struct CachedListing<T> {
  pub listing: Listing<T>,
  /// When the listing was fetched
  pub cached_at: DateTime<Utc>,
}

/// SQLite-based listing storage.
pub struct ListingStorage {
  db: Database,
}

impl ListingStorage {
  pub fn new(db: Database) -> Self {
    Self { db }
  }

  /// Store a freshly fetched listing, resetting its cached_at.
  pub fn store_listing<T: Cacheable>(
    &self,
    key: &str,
    description: &str,
    listing: &Listing<T>,
  ) -> Result<()> {
    let data = serde_json::to_vec(&listing.entries)
      .map_err(|e| eyre!("Failed to serialize listing: {}", e))?;

    self.db.with_conn(|conn| {
      conn
        .execute(
          "INSERT OR REPLACE INTO listing_cache
             (query_hash, query_description, entity_type, data, total, cached_at)
           VALUES (?, ?, ?, ?, ?, datetime('now'))",
          params![key, description, T::entity_type(), data, listing.total as i64],
        )
        .map_err(|e| eyre!("Failed to store listing: {}", e))?;
      Ok(())
    })
  }

  /// Rewrite the entries of an existing listing, keeping its cached_at.
  ///
  /// Returns false when nothing is cached under `key`.
  pub fn update_listing<T: Cacheable>(&self, key: &str, listing: &Listing<T>) -> Result<bool> {
    let data = serde_json::to_vec(&listing.entries)
      .map_err(|e| eyre!("Failed to serialize listing: {}", e))?;

    self.db.with_conn(|conn| {
      let updated = conn
        .execute(
          "UPDATE listing_cache SET data = ?, total = ?
           WHERE query_hash = ? AND entity_type = ?",
          params![data, listing.total as i64, key, T::entity_type()],
        )
        .map_err(|e| eyre!("Failed to update listing: {}", e))?;
      Ok(updated > 0)
    })
  }

  /// Get a cached listing.
  pub fn get_listing<T: Cacheable>(&self, key: &str) -> Result<Option<CachedListing<T>>> {
    let row: Option<(Vec<u8>, i64, String)> = self.db.with_conn(|conn| {
      conn
        .query_row(
          "SELECT data, total, cached_at FROM listing_cache
           WHERE query_hash = ? AND entity_type = ?",
          params![key, T::entity_type()],
          |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()
        .map_err(|e| eyre!("Failed to read listing: {}", e))
    })?;

    let Some((data, total, cached_at)) = row else {
      return Ok(None);
    };

    let entries: Vec<T> =
      serde_json::from_slice(&data).map_err(|e| eyre!("Failed to deserialize listing: {}", e))?;

    Ok(Some(CachedListing {
      listing: Listing::new(entries, usize::try_from(total).unwrap_or(0)),
      cached_at: parse_datetime(&cached_at)?,
    }))
  }
}
