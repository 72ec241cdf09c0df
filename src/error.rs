//! Failures reported by the offline store and its collaborators.

use thiserror::Error;

/// Errors surfaced by offline store operations.
///
/// A missing article is not an error: it is reported as empty data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OfflineError {
  /// The remote source failed while retrieving full content
  #[error("{0}")]
  FetchFailure(String),
  /// The persistence backend rejected the operation
  #[error("{0}")]
  StorageFailure(String),
}

impl OfflineError {
  pub fn fetch(err: impl std::fmt::Display) -> Self {
    Self::FetchFailure(err.to_string())
  }

  pub fn storage(err: impl std::fmt::Display) -> Self {
    Self::StorageFailure(err.to_string())
  }
}
