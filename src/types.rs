use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::listing::Identified;

/// An article, either a listing stub or a full record.
///
/// Stubs carry listing-level fields only; a full record additionally holds
/// `content`. All optional fields are `None` when the payload omitted them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
  pub id: i64,
  #[serde(default)]
  pub title: String,
  pub url: Option<String>,
  /// Short excerpt shown in listings
  pub text: Option<String>,
  /// Full HTML content, only present on full records
  pub content: Option<String>,
  pub image: Option<String>,
  pub published_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub is_offline: bool,
}

impl Article {
  /// A bare stub carrying only the identifier.
  pub fn stub(id: i64) -> Self {
    Self {
      id,
      title: String::new(),
      url: None,
      text: None,
      content: None,
      image: None,
      published_at: None,
      is_offline: false,
    }
  }

  /// Merge a full payload over this stub.
  ///
  /// Fields of `full` win; fields the full payload left empty keep the
  /// stub's value.
  pub fn merged_with(self, full: Article) -> Article {
    Article {
      id: self.id,
      title: if full.title.is_empty() {
        self.title
      } else {
        full.title
      },
      url: full.url.or(self.url),
      text: full.text.or(self.text),
      content: full.content.or(self.content),
      image: full.image.or(self.image),
      published_at: full.published_at.or(self.published_at),
      is_offline: self.is_offline || full.is_offline,
    }
  }

  /// Title for display, falling back to the identifier.
  pub fn display_title(&self) -> String {
    if self.title.is_empty() {
      format!("#{}", self.id)
    } else {
      self.title.clone()
    }
  }
}

impl Identified for Article {
  fn id(&self) -> i64 {
    self.id
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn stub() -> Article {
    Article {
      title: "From listing".to_string(),
      url: Some("https://example.org/a".to_string()),
      text: Some("excerpt".to_string()),
      image: Some("https://example.org/a.png".to_string()),
      ..Article::stub(4)
    }
  }

  #[test]
  fn test_full_fields_take_precedence() {
    let full = Article {
      title: "Full title".to_string(),
      text: Some("longer excerpt".to_string()),
      content: Some("<p>body</p>".to_string()),
      ..Article::stub(4)
    };

    let merged = stub().merged_with(full);
    assert_eq!(merged.title, "Full title");
    assert_eq!(merged.text.as_deref(), Some("longer excerpt"));
    assert_eq!(merged.content.as_deref(), Some("<p>body</p>"));
  }

  #[test]
  fn test_merge_keeps_stub_only_fields() {
    let full = Article {
      content: Some("<p>body</p>".to_string()),
      ..Article::stub(4)
    };

    let merged = stub().merged_with(full);
    assert_eq!(merged.title, "From listing");
    assert_eq!(merged.url.as_deref(), Some("https://example.org/a"));
    assert_eq!(merged.image.as_deref(), Some("https://example.org/a.png"));
  }

  #[test]
  fn test_display_title_falls_back_to_id() {
    assert_eq!(Article::stub(12).display_title(), "#12");
    assert_eq!(stub().display_title(), "From listing");
  }
}
