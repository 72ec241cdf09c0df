//! Archive services: a remote listing kept in the local cache and patched in
//! place after bulk deletions.

use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::cache::{CacheLayer, CacheResult, Cacheable, QueryKey};
use crate::listing::{Identified, Listing};
use crate::remote::ApiClient;

/// An archive service configured on the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveService {
  pub id: i64,
  pub alias: String,
  pub provider: String,
  #[serde(default)]
  pub is_default: bool,
}

impl Identified for ArchiveService {
  fn id(&self) -> i64 {
    self.id
  }
}

impl Cacheable for ArchiveService {
  fn entity_type() -> &'static str {
    "archive_service"
  }
}

/// Cache keys for remote listings.
#[derive(Clone, Debug)]
pub enum ListingKey {
  /// All archive services of the current user
  Archivers,
}

impl QueryKey for ListingKey {
  fn cache_hash(&self) -> String {
    let input = match self {
      Self::Archivers => "archivers",
    };

    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
  }

  fn description(&self) -> String {
    match self {
      Self::Archivers => "archive services".to_string(),
    }
  }
}

/// List archive services, served from cache when fresh or when offline.
pub async fn list(
  client: &ApiClient,
  cache: &CacheLayer,
) -> Result<CacheResult<Listing<ArchiveService>>> {
  cache
    .fetch_list(&ListingKey::Archivers, || client.list_archivers())
    .await
}

/// Delete archive services and drop them from the cached listing.
///
/// Returns the message to show the user.
pub async fn delete(client: &ApiClient, cache: &CacheLayer, ids: &[i64]) -> Result<String> {
  let deleted = client.delete_archivers(ids).await?;
  let count = deleted.len();
  info!(requested = ids.len(), deleted = count, "archive services deleted");

  cache.apply_deletions::<ArchiveService, _>(&ListingKey::Archivers, deleted)?;

  Ok(removed_message(count))
}

fn removed_message(count: usize) -> String {
  if count > 1 {
    format!("{} archive services removed", count)
  } else {
    "Archive service removed".to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{CacheSource, ListingStorage};
  use crate::config::ApiConfig;
  use crate::db::Database;
  use serde_json::json;
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn service(id: i64, alias: &str) -> serde_json::Value {
    let is_default = id == 1;
    json!({ "id": id, "alias": alias, "provider": "keeper", "is_default": is_default })
  }

  async fn setup() -> (MockServer, ApiClient, CacheLayer) {
    let server = MockServer::start().await;
    let client = ApiClient::new(&ApiConfig {
      url: Some(server.uri()),
      timeout_secs: 5,
    })
    .unwrap();
    let cache = CacheLayer::new(ListingStorage::new(Database::open_in_memory().unwrap()));
    (server, client, cache)
  }

  #[test]
  fn test_removed_message() {
    assert_eq!(removed_message(1), "Archive service removed");
    assert_eq!(removed_message(0), "Archive service removed");
    assert_eq!(removed_message(3), "3 archive services removed");
  }

  #[test]
  fn test_cache_hash_is_stable_hex() {
    let hash = ListingKey::Archivers.cache_hash();
    assert_eq!(hash.len(), 64);
    assert_eq!(hash, ListingKey::Archivers.cache_hash());
  }

  #[tokio::test]
  async fn test_delete_patches_cached_listing() {
    let (server, client, cache) = setup().await;
    Mock::given(method("GET"))
      .and(path("/archivers"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "archivers": [service(1, "a"), service(2, "b"), service(3, "c")],
        "total": 3
      })))
      .expect(1)
      .mount(&server)
      .await;
    Mock::given(method("POST"))
      .and(path("/archivers/delete"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "deleted": [2, 9] })))
      .mount(&server)
      .await;

    let first = list(&client, &cache).await.unwrap();
    assert_eq!(first.source, CacheSource::Network);
    assert_eq!(first.data.entries.len(), 3);

    let message = delete(&client, &cache, &[2, 9]).await.unwrap();
    assert_eq!(message, "2 archive services removed");

    // Served from the patched cache, not refetched.
    let patched = list(&client, &cache).await.unwrap();
    assert_eq!(patched.source, CacheSource::CacheFresh);
    let aliases: Vec<&str> = patched.data.entries.iter().map(|s| s.alias.as_str()).collect();
    assert_eq!(aliases, vec!["a", "c"]);
    assert_eq!(patched.data.total, 2);
  }

  #[tokio::test]
  async fn test_delete_without_cached_listing() {
    let (server, client, cache) = setup().await;
    Mock::given(method("POST"))
      .and(path("/archivers/delete"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "deleted": [4] })))
      .mount(&server)
      .await;

    let message = delete(&client, &cache, &[4]).await.unwrap();
    assert_eq!(message, "Archive service removed");
  }
}
