//! The offline entity store: articles kept locally for reading without
//! connectivity.
//!
//! The store owns three things: the persisted collection (through an
//! [`OfflineStorage`] backend), a `selected` slot for the detail view, and a
//! store-level status. Views never hold references into the collection; they
//! read cloned snapshots through [`OfflineStore::state`] and
//! [`OfflineStore::list`].
//!
//! Overlapping `fetch_one` calls for the same id resolve "last request
//! wins": every call takes a fresh token, and a result only commits while its
//! token is still the latest one issued for that id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use super::notify::{LogNotifier, Message, Notifier};
use super::storage::OfflineStorage;
use crate::error::OfflineError;
use crate::remote::ArticleSource;
use crate::response::Response;
use crate::types::Article;

/// Store-level operation status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Status {
  #[default]
  Idle,
  Loading,
  Error,
}

/// Content of the detail slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selected {
  /// Nothing requested yet
  #[default]
  Absent,
  /// The requested id has no offline copy
  Missing(i64),
  Article(Article),
}

impl Selected {
  fn id(&self) -> Option<i64> {
    match self {
      Selected::Absent => None,
      Selected::Missing(id) => Some(*id),
      Selected::Article(article) => Some(article.id),
    }
  }
}

/// Snapshot of the store's observable state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfflineState {
  pub selected: Selected,
  pub status: Status,
  /// Last failure, cleared by the next successful operation
  pub last_error: Option<String>,
}

impl OfflineState {
  pub fn is_loading(&self) -> bool {
    self.status == Status::Loading
  }

  /// The selected slot as a data signal: `None` when nothing was requested,
  /// `Some(None)` when the requested article is not stored.
  pub fn data(&self) -> Option<Option<&Article>> {
    match &self.selected {
      Selected::Absent => None,
      Selected::Missing(_) => Some(None),
      Selected::Article(article) => Some(Some(article)),
    }
  }

  /// The selected slot reconciled against status and error.
  pub fn response(&self) -> Response<Option<&Article>, &str> {
    Response::from_signals(self.data(), self.last_error.as_deref(), self.is_loading())
  }
}

#[derive(Default)]
struct Inner {
  state: OfflineState,
  in_flight: usize,
  next_token: u64,
  /// Latest fetch token per id; removed once that fetch commits
  latest: HashMap<i64, u64>,
}

impl Inner {
  /// Issue a fresh request token for `id`, superseding any pending fetch.
  fn claim(&mut self, id: i64) -> u64 {
    self.next_token += 1;
    self.latest.insert(id, self.next_token);
    self.next_token
  }

  /// Drop the token for `id` if it is still `token`. Returns whether the
  /// request was still the latest one.
  fn release(&mut self, id: i64, token: u64) -> bool {
    if self.latest.get(&id) == Some(&token) {
      self.latest.remove(&id);
      true
    } else {
      false
    }
  }

  fn begin(&mut self) {
    self.in_flight += 1;
    self.state.status = Status::Loading;
  }

  fn record(&mut self, result: Result<(), &OfflineError>) {
    match result {
      Ok(()) => self.state.last_error = None,
      Err(err) => self.state.last_error = Some(err.to_string()),
    }
  }

  /// Close one operation. Status settles only when nothing else is in flight.
  fn settle(&mut self) {
    self.in_flight = self.in_flight.saturating_sub(1);
    if self.in_flight == 0 {
      self.state.status = if self.state.last_error.is_some() {
        Status::Error
      } else {
        Status::Idle
      };
    }
  }
}

/// Offline article store over a persistence backend.
///
/// Construct once and share behind an `Arc`.
pub struct OfflineStore<S: OfflineStorage> {
  storage: Arc<S>,
  inner: Mutex<Inner>,
  notifier: Arc<dyn Notifier>,
}

impl<S: OfflineStorage> OfflineStore<S> {
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
      inner: Mutex::new(Inner::default()),
      notifier: Arc::new(LogNotifier),
    }
  }

  /// Replace the notifier that receives user messages.
  pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
    self.notifier = notifier;
    self
  }

  fn inner(&self) -> MutexGuard<'_, Inner> {
    // State updates never panic mid-way, so a poisoned lock still holds a
    // consistent snapshot.
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Current state snapshot.
  pub fn state(&self) -> OfflineState {
    self.inner().state.clone()
  }

  /// Run a blocking storage call on the blocking pool.
  async fn blocking<T, F>(&self, f: F) -> Result<T, OfflineError>
  where
    T: Send + 'static,
    F: FnOnce(&S) -> color_eyre::Result<T> + Send + 'static,
  {
    let storage = Arc::clone(&self.storage);
    tokio::task::spawn_blocking(move || f(&storage))
      .await
      .map_err(|e| OfflineError::storage(format!("storage task failed: {}", e)))?
      .map_err(OfflineError::storage)
  }

  /// Load the offline copy of `id` into the selected slot.
  ///
  /// A missing copy leaves the slot explicitly empty and is not an error. If
  /// another operation on the same id starts before this one resolves,
  /// this result is discarded.
  pub async fn fetch_one(&self, id: i64) {
    let token = {
      let mut inner = self.inner();
      inner.begin();
      inner.claim(id)
    };
    debug!(id, token, "fetching offline article");

    let result = self.blocking(move |s| s.get(id)).await;

    let mut inner = self.inner();
    if !inner.release(id, token) {
      debug!(id, token, "discarding superseded fetch");
      inner.settle();
      return;
    }

    match result {
      Ok(Some(mut article)) => {
        article.is_offline = true;
        inner.state.selected = Selected::Article(article);
        inner.record(Ok(()));
      }
      Ok(None) => {
        debug!(id, "no offline copy");
        inner.state.selected = Selected::Missing(id);
        inner.record(Ok(()));
      }
      Err(err) => {
        warn!(id, error = %err, "failed to load offline article");
        inner.record(Err(&err));
      }
    }
    inner.settle();
  }

  /// Upsert a full article, marking it offline.
  ///
  /// The record replaces any previous copy as a whole. A `fetch_one` for the
  /// same id that is still pending is superseded.
  pub async fn save(&self, article: Article) -> Result<(), OfflineError> {
    let mut article = article;
    article.is_offline = true;
    let id = article.id;
    let token = {
      let mut inner = self.inner();
      inner.begin();
      inner.claim(id)
    };

    let record = article.clone();
    let result = self.blocking(move |s| s.put(&record)).await;

    let mut inner = self.inner();
    let latest = inner.release(id, token);
    inner.record(result.as_ref().map(|_| ()));
    match &result {
      Ok(()) => {
        info!(id, "article saved offline");
        if latest && inner.state.selected.id() == Some(id) {
          inner.state.selected = Selected::Article(article);
        }
      }
      Err(err) => warn!(id, error = %err, "failed to save article"),
    }
    inner.settle();
    result
  }

  /// Delete the offline copy of `article`. Removing an absent copy succeeds.
  ///
  /// A `fetch_one` for the same id that is still pending is superseded.
  pub async fn remove(&self, article: &Article) -> Result<(), OfflineError> {
    let id = article.id;
    let token = {
      let mut inner = self.inner();
      inner.begin();
      inner.claim(id)
    };

    let result = self.blocking(move |s| s.delete(id)).await;

    let mut inner = self.inner();
    inner.release(id, token);
    inner.record(result.as_ref().map(|_| ()));
    match &result {
      Ok(existed) => {
        info!(id, existed, "article removed from offline storage");
        if inner.state.selected.id() == Some(id) {
          inner.state.selected = Selected::Missing(id);
        }
      }
      Err(err) => warn!(id, error = %err, "failed to remove article"),
    }
    inner.settle();
    result.map(|_| ())
  }

  /// Offline articles in the order they were first saved.
  pub async fn list(&self) -> Result<Vec<Article>, OfflineError> {
    self.inner().begin();

    let result = self.blocking(|s| s.list()).await.map(|articles| {
      articles
        .into_iter()
        .map(|mut a| {
          a.is_offline = true;
          a
        })
        .collect::<Vec<_>>()
    });

    let mut inner = self.inner();
    inner.record(result.as_ref().map(|_| ()));
    inner.settle();
    result
  }

  /// Fetch the full article behind `stub`, merge it over the stub and save
  /// it.
  ///
  /// Returns the saved record, or `None` when the source has no such
  /// article. Outcomes are reported through the notifier.
  pub async fn put_offline<A: ArticleSource>(
    &self,
    stub: Article,
    source: &A,
  ) -> Result<Option<Article>, OfflineError> {
    let id = stub.id;
    let title = stub.display_title();
    self.inner().begin();
    let fetched = source.get_article(id).await;
    {
      let mut inner = self.inner();
      if let Err(err) = &fetched {
        warn!(id, error = %err, "failed to fetch full article");
        inner.record(Err(err));
      }
      inner.settle();
    }

    let full = match fetched {
      Ok(Some(full)) => full,
      Ok(None) => {
        self
          .notifier
          .notify(Message::error(format!("Article #{} not found.", id)));
        return Ok(None);
      }
      Err(err) => {
        self.notifier.notify(Message::error(err.to_string()));
        return Err(err);
      }
    };

    let mut article = stub.merged_with(full);
    article.is_offline = true;
    match self.save(article.clone()).await {
      Ok(()) => {
        self
          .notifier
          .notify(Message::info(format!("Article put offline: {}", title)));
        Ok(Some(article))
      }
      Err(err) => {
        self.notifier.notify(Message::error(err.to_string()));
        Err(err)
      }
    }
  }

  /// Remove the offline copy of `article` and report it to the user.
  pub async fn remove_offline(&self, article: &Article) -> Result<(), OfflineError> {
    match self.remove(article).await {
      Ok(()) => {
        self.notifier.notify(Message::info(format!(
          "Article removed from offline storage: {}",
          article.display_title()
        )));
        Ok(())
      }
      Err(err) => {
        self.notifier.notify(Message::error(err.to_string()));
        Err(err)
      }
    }
  }
}
