use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub storage: StorageConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the article API, required only for remote commands
  pub url: Option<String>,
  /// Request timeout in seconds
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      url: None,
      timeout_secs: default_timeout_secs(),
    }
  }
}

fn default_timeout_secs() -> u64 {
  30
}

impl ApiConfig {
  /// Parsed base URL, always ending with a slash so endpoints join below it.
  pub fn base_url(&self) -> Result<Url> {
    let raw = self
      .url
      .as_deref()
      .ok_or_else(|| eyre!("API url not configured. Set api.url in the config file."))?;

    let normalized = if raw.ends_with('/') {
      raw.to_string()
    } else {
      format!("{}/", raw)
    };

    Url::parse(&normalized).map_err(|e| eyre!("Invalid API url {}: {}", raw, e))
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
  /// Database file; defaults to the user data directory
  pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Minutes before a cached listing is refetched
  #[serde(default = "default_stale_minutes")]
  pub stale_minutes: i64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      stale_minutes: default_stale_minutes(),
    }
  }
}

fn default_stale_minutes() -> i64 {
  5
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./readoff.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/readoff/config.yaml
  ///
  /// Without any file the defaults apply.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("readoff.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("readoff").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    Ok(config)
  }

  /// Directory for the database and log files.
  pub fn data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("readoff"))
  }

  /// Database path, from config or the data directory.
  pub fn database_path(&self) -> Result<PathBuf> {
    match &self.storage.path {
      Some(path) => Ok(path.clone()),
      None => Ok(Self::data_dir()?.join("readoff.db")),
    }
  }

  /// Get the API token from the environment, if set.
  ///
  /// Checks READOFF_API_TOKEN.
  pub fn get_api_token() -> Option<String> {
    std::env::var("READOFF_API_TOKEN")
      .ok()
      .filter(|token| !token.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_full_config() {
    let config = Config::parse(
      r#"
api:
  url: https://api.example.org/v1
  timeout_secs: 10
storage:
  path: /tmp/offline.db
cache:
  stale_minutes: 15
"#,
    )
    .unwrap();

    assert_eq!(config.api.timeout_secs, 10);
    assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/offline.db"));
    assert_eq!(config.cache.stale_minutes, 15);
    assert_eq!(
      config.api.base_url().unwrap().join("articles/3").unwrap().as_str(),
      "https://api.example.org/v1/articles/3"
    );
  }

  #[test]
  fn test_missing_sections_use_defaults() {
    let config = Config::parse("api:\n  url: http://localhost:8080\n").unwrap();
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.cache.stale_minutes, 5);
    assert!(config.storage.path.is_none());
  }

  #[test]
  fn test_base_url_requires_url() {
    let err = ApiConfig::default().base_url().unwrap_err();
    assert!(err.to_string().contains("not configured"));
  }

  #[test]
  fn test_explicit_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Config::load(Some(dir.path().join("nope.yaml").as_path())).is_err());
  }

  #[test]
  fn test_load_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("readoff.yaml");
    std::fs::write(&path, "cache:\n  stale_minutes: 1\n").unwrap();

    let config = Config::load(Some(path.as_path())).unwrap();
    assert_eq!(config.cache.stale_minutes, 1);
  }
}
