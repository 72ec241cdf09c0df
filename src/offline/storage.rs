//! Persistence backends for offline articles.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, OptionalExtension};
use std::sync::Mutex;

use crate::db::Database;
use crate::types::Article;

/// CRUD contract the offline store is written against.
///
/// Calls may block; the store runs them off the async executor.
pub trait OfflineStorage: Send + Sync + 'static {
  /// Get a stored article by id.
  fn get(&self, id: i64) -> Result<Option<Article>>;

  /// Insert or replace the article as a single atomic write.
  ///
  /// Replacing an existing id keeps its position in `list`.
  fn put(&self, article: &Article) -> Result<()>;

  /// Delete an article, returning whether it was present.
  fn delete(&self, id: i64) -> Result<bool>;

  /// All stored articles in first-save order.
  fn list(&self) -> Result<Vec<Article>>;
}

/// Storage kept in process memory. Nothing survives a restart.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStorage {
  articles: Mutex<Vec<Article>>,
}

#[cfg(test)]
impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn articles(&self) -> Result<std::sync::MutexGuard<'_, Vec<Article>>> {
    self
      .articles
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

#[cfg(test)]
impl OfflineStorage for MemoryStorage {
  fn get(&self, id: i64) -> Result<Option<Article>> {
    Ok(self.articles()?.iter().find(|a| a.id == id).cloned())
  }

  fn put(&self, article: &Article) -> Result<()> {
    let mut articles = self.articles()?;
    match articles.iter_mut().find(|a| a.id == article.id) {
      Some(existing) => *existing = article.clone(),
      None => articles.push(article.clone()),
    }
    Ok(())
  }

  fn delete(&self, id: i64) -> Result<bool> {
    let mut articles = self.articles()?;
    let before = articles.len();
    articles.retain(|a| a.id != id);
    Ok(articles.len() != before)
  }

  fn list(&self) -> Result<Vec<Article>> {
    Ok(self.articles()?.clone())
  }
}

/// SQLite-backed storage that survives restarts.
pub struct SqliteStorage {
  db: Database,
}

impl SqliteStorage {
  pub fn new(db: Database) -> Self {
    Self { db }
  }
}

impl OfflineStorage for SqliteStorage {
  fn get(&self, id: i64) -> Result<Option<Article>> {
    let data: Option<Vec<u8>> = self.db.with_conn(|conn| {
      conn
        .query_row(
          "SELECT data FROM offline_articles WHERE id = ?",
          params![id],
          |row| row.get(0),
        )
        .optional()
        .map_err(|e| eyre!("Failed to read article {}: {}", id, e))
    })?;

    data
      .map(|data| {
        serde_json::from_slice(&data)
          .map_err(|e| eyre!("Failed to deserialize article {}: {}", id, e))
      })
      .transpose()
  }

  fn put(&self, article: &Article) -> Result<()> {
    let data =
      serde_json::to_vec(article).map_err(|e| eyre!("Failed to serialize article: {}", e))?;

    // Upsert in one statement; the conflict branch updates in place so `seq`
    // keeps the first-save position.
    self.db.with_conn(|conn| {
      conn
        .execute(
          "INSERT INTO offline_articles (id, title, data, saved_at)
           VALUES (?, ?, ?, datetime('now'))
           ON CONFLICT(id) DO UPDATE SET
             title = excluded.title,
             data = excluded.data,
             saved_at = excluded.saved_at",
          params![article.id, article.title, data],
        )
        .map_err(|e| eyre!("Failed to store article {}: {}", article.id, e))?;
      Ok(())
    })
  }

  fn delete(&self, id: i64) -> Result<bool> {
    self.db.with_conn(|conn| {
      let deleted = conn
        .execute("DELETE FROM offline_articles WHERE id = ?", params![id])
        .map_err(|e| eyre!("Failed to delete article {}: {}", id, e))?;
      Ok(deleted > 0)
    })
  }

  fn list(&self) -> Result<Vec<Article>> {
    let rows: Vec<Vec<u8>> = self.db.with_conn(|conn| {
      let mut stmt = conn
        .prepare("SELECT data FROM offline_articles ORDER BY seq")
        .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

      let rows = stmt
        .query_map([], |row| row.get(0))
        .map_err(|e| eyre!("Failed to list articles: {}", e))?
        .collect::<rusqlite::Result<Vec<Vec<u8>>>>()
        .map_err(|e| eyre!("Failed to read article row: {}", e))?;
      Ok(rows)
    })?;

    rows
      .iter()
      .map(|data| {
        serde_json::from_slice(data).map_err(|e| eyre!("Failed to deserialize article: {}", e))
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn article(id: i64, title: &str) -> Article {
    Article {
      title: title.to_string(),
      content: Some(format!("<p>{}</p>", title)),
      ..Article::stub(id)
    }
  }

  fn exercise(storage: &dyn OfflineStorage) {
    assert_eq!(storage.get(1).unwrap(), None);

    storage.put(&article(2, "second")).unwrap();
    storage.put(&article(1, "first")).unwrap();
    storage.put(&article(3, "third")).unwrap();
    storage.put(&article(2, "second v2")).unwrap();

    let titles: Vec<String> = storage.list().unwrap().into_iter().map(|a| a.title).collect();
    assert_eq!(titles, vec!["second v2", "first", "third"]);
    assert_eq!(storage.get(2).unwrap(), Some(article(2, "second v2")));

    assert!(storage.delete(1).unwrap());
    assert!(!storage.delete(1).unwrap());
    assert_eq!(storage.list().unwrap().len(), 2);
  }

  #[test]
  fn test_memory_storage_upserts_in_place() {
    exercise(&MemoryStorage::new());
  }

  #[test]
  fn test_sqlite_storage_upserts_in_place() {
    exercise(&SqliteStorage::new(Database::open_in_memory().unwrap()));
  }

  #[test]
  fn test_sqlite_storage_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("offline.db");

    {
      let storage = SqliteStorage::new(Database::open(&path).unwrap());
      storage.put(&article(7, "kept")).unwrap();
    }

    let storage = SqliteStorage::new(Database::open(&path).unwrap());
    assert_eq!(storage.get(7).unwrap(), Some(article(7, "kept")));
  }
}
