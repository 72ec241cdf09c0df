use color_eyre::{eyre::eyre, Result};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::api_types::{ApiArchiversResponse, ApiDeleteRequest, ApiDeleteResponse};
use crate::archivers::ArchiveService;
use crate::config::ApiConfig;
use crate::listing::{DeletionSet, Listing};
use crate::types::Article;

/// HTTP client for the article API
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base: Url,
  token: Option<String>,
}

impl ApiClient {
  pub fn new(config: &ApiConfig) -> Result<Self> {
    let base = config.base_url()?;
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base,
      token: None,
    })
  }

  /// Set the bearer token sent with every request
  pub fn with_token(mut self, token: Option<String>) -> Self {
    self.token = token;
    self
  }

  fn endpoint(&self, path: &str) -> Result<Url> {
    self
      .base
      .join(path)
      .map_err(|e| eyre!("Invalid endpoint {}: {}", path, e))
  }

  fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
    let builder = self.http.request(method, url);
    match &self.token {
      Some(token) => builder.bearer_auth(token),
      None => builder,
    }
  }

  /// Get the full article, or `None` if the server does not know it
  pub async fn get_article(&self, id: i64) -> Result<Option<Article>> {
    let url = self.endpoint(&format!("articles/{}", id))?;
    debug!(%url, "fetching full article");

    let response = self
      .request(reqwest::Method::GET, url)
      .send()
      .await
      .map_err(|e| eyre!("Failed to fetch article {}: {}", id, e))?;

    if response.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }

    let article = response
      .error_for_status()
      .map_err(|e| eyre!("Failed to fetch article {}: {}", id, e))?
      .json::<Article>()
      .await
      .map_err(|e| eyre!("Failed to parse article {}: {}", id, e))?;

    Ok(Some(article))
  }

  /// List archive services
  pub async fn list_archivers(&self) -> Result<Listing<ArchiveService>> {
    let url = self.endpoint("archivers")?;

    let response: ApiArchiversResponse = self
      .request(reqwest::Method::GET, url)
      .send()
      .await
      .and_then(|r| r.error_for_status())
      .map_err(|e| eyre!("Failed to fetch archive services: {}", e))?
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse archive services: {}", e))?;

    Ok(response.into_listing())
  }

  /// Delete archive services, returning the ids the server confirmed
  pub async fn delete_archivers(&self, ids: &[i64]) -> Result<DeletionSet> {
    let url = self.endpoint("archivers/delete")?;

    let response: ApiDeleteResponse = self
      .request(reqwest::Method::POST, url)
      .json(&ApiDeleteRequest { ids })
      .send()
      .await
      .and_then(|r| r.error_for_status())
      .map_err(|e| eyre!("Failed to delete archive services: {}", e))?
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse delete response: {}", e))?;

    Ok(DeletionSet::from(response.deleted))
  }
}
