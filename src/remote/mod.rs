//! Remote API access.

pub mod api_types;
mod client;

pub use client::ApiClient;

use std::future::Future;

use crate::error::OfflineError;
use crate::types::Article;

/// Source of full article payloads.
///
/// `Ok(None)` means the source has no such article.
pub trait ArticleSource: Send + Sync {
  fn get_article(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Article>, OfflineError>> + Send;
}

impl ArticleSource for ApiClient {
  async fn get_article(&self, id: i64) -> Result<Option<Article>, OfflineError> {
    ApiClient::get_article(self, id)
      .await
      .map_err(OfflineError::fetch)
  }
}
