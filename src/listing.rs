//! Cached listings and their reconciliation after bulk deletions.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Records that carry a stable numeric identifier.
pub trait Identified {
  fn id(&self) -> i64;
}

/// An ordered page of records together with the collection's total count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing<T> {
  pub entries: Vec<T>,
  pub total: usize,
}

impl<T> Listing<T> {
  pub fn new(entries: Vec<T>, total: usize) -> Self {
    Self { entries, total }
  }
}

impl<T> From<Vec<T>> for Listing<T> {
  fn from(entries: Vec<T>) -> Self {
    let total = entries.len();
    Self { entries, total }
  }
}

/// Identifiers confirmed deleted by a mutation.
///
/// Consumed by [`Listing::reconcile`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionSet(Vec<i64>);

impl DeletionSet {
  pub fn ids(&self) -> &[i64] {
    &self.0
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl From<Vec<i64>> for DeletionSet {
  fn from(ids: Vec<i64>) -> Self {
    Self(ids)
  }
}

/// Outcome of applying a [`DeletionSet`] to a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled<T> {
  pub listing: Listing<T>,
  /// Number of entries actually removed
  pub removed: usize,
}

impl<T: Identified> Listing<T> {
  /// Drop every entry whose id was deleted.
  ///
  /// Survivors keep their relative order. `total` shrinks by the number of
  /// entries removed, not by the size of the set: ids the listing never held
  /// are ignored.
  pub fn reconcile(self, deletions: DeletionSet) -> Reconciled<T> {
    if deletions.is_empty() {
      return Reconciled {
        listing: self,
        removed: 0,
      };
    }

    let deleted: HashSet<i64> = deletions.ids().iter().copied().collect();
    let before = self.entries.len();
    let mut seen = HashSet::new();

    let entries: Vec<T> = self
      .entries
      .into_iter()
      .filter(|entry| {
        let id = entry.id();
        if deleted.contains(&id) {
          seen.insert(id);
          false
        } else {
          true
        }
      })
      .collect();

    for &id in deletions.ids().iter().filter(|id| !seen.contains(*id)) {
      debug!(id, "deleted id not present in cached listing");
    }

    let removed = before - entries.len();
    Reconciled {
      listing: Listing {
        entries,
        total: self.total.saturating_sub(removed),
      },
      removed,
    }
  }
}
