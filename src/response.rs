//! Reconciles the loading, error and data signals of an async fetch into a
//! single render decision.
//!
//! Every surface that shows fetched data goes through this module, so the
//! precedence between the three signals is decided in one place.
//!
//! # Example
//!
//! ```ignore
//! let branches = Branches::new(
//!     || "loading...".to_string(),
//!     |err: &str| format!("error: {}", err),
//!     |article: Option<&Article>| article.map(|a| a.title.clone()).unwrap_or_default(),
//!     || "loading...".to_string(),
//! );
//!
//! let state = store.state();
//! let text = branches.render(state.data(), state.last_error.as_deref(), state.is_loading());
//! ```

/// The branch selected for a `(data, error, loading)` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response<T, E> {
  /// A fetch is in flight; any data or error present is stale
  Loading,
  /// The last fetch failed
  Error(E),
  /// Data is available, possibly an empty value
  Data(T),
  /// Nothing has been requested yet
  Other,
}

impl<T, E> Response<T, E> {
  /// Derive the branch from the three signals.
  ///
  /// Loading wins over everything, then error, then data. A triple with
  /// none of them falls through to `Other`.
  pub fn from_signals(data: Option<T>, error: Option<E>, loading: bool) -> Self {
    if loading {
      return Response::Loading;
    }
    match (error, data) {
      (Some(error), _) => Response::Error(error),
      (None, Some(data)) => Response::Data(data),
      (None, None) => Response::Other,
    }
  }

  pub fn is_error(&self) -> bool {
    matches!(self, Response::Error(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      Response::Data(data) => Some(data),
      _ => None,
    }
  }
}

type Producer<'a, R> = Box<dyn Fn() -> R + 'a>;
type Consumer<'a, V, R> = Box<dyn Fn(V) -> R + 'a>;

/// One producer per response branch.
///
/// Built once by a view and invoked on every render with the current
/// signals.
pub struct Branches<'a, T, E, R> {
  loading: Producer<'a, R>,
  error: Consumer<'a, E, R>,
  data: Consumer<'a, T, R>,
  other: Producer<'a, R>,
}

impl<'a, T, E, R> Branches<'a, T, E, R> {
  pub fn new(
    loading: impl Fn() -> R + 'a,
    error: impl Fn(E) -> R + 'a,
    data: impl Fn(T) -> R + 'a,
    other: impl Fn() -> R + 'a,
  ) -> Self {
    Self {
      loading: Box::new(loading),
      error: Box::new(error),
      data: Box::new(data),
      other: Box::new(other),
    }
  }

  /// Select the branch for the given signals and produce its output.
  pub fn render(&self, data: Option<T>, error: Option<E>, loading: bool) -> R {
    self.dispatch(Response::from_signals(data, error, loading))
  }

  /// Produce the output for an already derived response.
  pub fn dispatch(&self, response: Response<T, E>) -> R {
    match response {
      Response::Loading => (self.loading)(),
      Response::Error(error) => (self.error)(error),
      Response::Data(data) => (self.data)(data),
      Response::Other => (self.other)(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn labels() -> Branches<'static, Vec<i32>, String, String> {
    Branches::new(
      || "loading".to_string(),
      |e| format!("error:{}", e),
      |d: Vec<i32>| format!("data:{}", d.len()),
      || "other".to_string(),
    )
  }

  #[test]
  fn test_loading_wins_over_stale_data_and_error() {
    let branches = labels();
    assert_eq!(branches.render(None, None, true), "loading");
    assert_eq!(branches.render(Some(vec![1]), None, true), "loading");
    assert_eq!(branches.render(None, Some("boom".into()), true), "loading");
    assert_eq!(
      branches.render(Some(vec![1, 2]), Some("boom".into()), true),
      "loading"
    );
  }

  #[test]
  fn test_error_wins_over_data() {
    let branches = labels();
    assert_eq!(branches.render(None, Some("boom".into()), false), "error:boom");
    assert_eq!(
      branches.render(Some(vec![1]), Some("boom".into()), false),
      "error:boom"
    );
  }

  #[test]
  fn test_empty_data_is_still_data() {
    let branches = labels();
    assert_eq!(branches.render(Some(Vec::new()), None, false), "data:0");
  }

  #[test]
  fn test_nothing_falls_through_to_other() {
    assert_eq!(labels().render(None, None, false), "other");
  }

  #[test]
  fn test_defined_none_is_data() {
    let response: Response<Option<i32>, String> = Response::from_signals(Some(None), None, false);
    assert_eq!(response, Response::Data(None));
    assert_eq!(response.data(), Some(&None));
  }

  #[test]
  fn test_branches_borrow_from_caller() {
    let id = 9;
    let branches: Branches<Option<&str>, &str, String> = Branches::new(
      || String::new(),
      |e: &str| e.to_string(),
      |title: Option<&str>| title.map(String::from).unwrap_or_else(|| format!("#{} not found", id)),
      || String::new(),
    );
    assert_eq!(branches.render(Some(None), None, false), "#9 not found");
    assert!(Response::<(), ()>::from_signals(None, Some(()), false).is_error());
  }
}
