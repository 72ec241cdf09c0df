//! Serde types matching the API's JSON envelopes.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use serde::{Deserialize, Serialize};

use crate::archivers::ArchiveService;
use crate::listing::Listing;

// ============================================================================
// Archive services
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiArchiversResponse {
  #[serde(default)]
  pub archivers: Vec<ArchiveService>,
  /// Absent on servers that do not paginate
  pub total: Option<usize>,
}

impl ApiArchiversResponse {
  pub fn into_listing(self) -> Listing<ArchiveService> {
    match self.total {
      Some(total) => Listing::new(self.archivers, total),
      None => Listing::from(self.archivers),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ApiDeleteRequest<'a> {
  pub ids: &'a [i64],
}

#[derive(Debug, Deserialize)]
pub struct ApiDeleteResponse {
  #[serde(default)]
  pub deleted: Vec<i64>,
}
