use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::view::{View, ViewAction};
use crate::offline::{Message, OfflineState, OfflineStorage, OfflineStore, Selected};
use crate::response::{Branches, Response};
use crate::types::Article;

/// View for reading one offline article
pub struct ArticleView<S: OfflineStorage> {
  id: i64,
  store: Arc<OfflineStore<S>>,
  messages: mpsc::UnboundedReceiver<Message>,
  /// Last message received from the store
  status: Option<Message>,
  scroll: u16,
}

impl<S: OfflineStorage> ArticleView<S> {
  /// Create the view and start loading the article.
  ///
  /// `messages` should receive the store's notifications.
  pub fn new(
    id: i64,
    store: Arc<OfflineStore<S>>,
    messages: mpsc::UnboundedReceiver<Message>,
  ) -> Self {
    let view = Self {
      id,
      store,
      messages,
      status: None,
      scroll: 0,
    };
    view.reload();
    view
  }

  fn reload(&self) {
    let store = Arc::clone(&self.store);
    let id = self.id;
    tokio::spawn(async move { store.fetch_one(id).await });
  }

  fn remove(&self) {
    if let Selected::Article(article) = self.store.state().selected {
      let store = Arc::clone(&self.store);
      tokio::spawn(async move {
        // Failures reach the user through the notifier
        let _ = store.remove_offline(&article).await;
      });
    }
  }

  fn body(&self, state: &OfflineState) -> Text<'static> {
    let id = self.id;
    let branches: Branches<Option<&Article>, &str, Text<'static>> = Branches::new(
      || placeholder("Loading article...".to_string(), Color::DarkGray),
      |err| placeholder(format!("Error: {}\n\nPress 'r' to retry.", err), Color::Red),
      |article| match article {
        Some(article) => article_text(article),
        None => placeholder(format!("Article #{} not found.", id), Color::Yellow),
      },
      || placeholder(format!("Opening article #{}...", id), Color::DarkGray),
    );

    branches.render(
      state.data(),
      state.last_error.as_deref(),
      state.is_loading(),
    )
  }

  fn title(&self, state: &OfflineState) -> String {
    match state.response() {
      Response::Loading => format!(" Offline article #{} (loading...) ", self.id),
      Response::Data(Some(article)) => format!(" {} ", article.display_title()),
      _ => format!(" Offline article #{} ", self.id),
    }
  }
}

/// Wrap width for converted HTML; the paragraph rewraps to the terminal.
const CONTENT_WIDTH: usize = 1000;

fn placeholder(text: String, color: Color) -> Text<'static> {
  Text::styled(text, Style::default().fg(color))
}

fn article_text(article: &Article) -> Text<'static> {
  let mut lines = vec![Line::from(Span::styled(
    article.display_title(),
    Style::default().add_modifier(Modifier::BOLD),
  ))];

  let mut meta = Vec::new();
  if let Some(published) = article.published_at {
    meta.push(published.format("%Y-%m-%d").to_string());
  }
  if let Some(url) = &article.url {
    meta.push(url.clone());
  }
  if !meta.is_empty() {
    lines.push(Line::from(Span::styled(
      meta.join("  "),
      Style::default().fg(Color::DarkGray),
    )));
  }
  lines.push(Line::default());

  let body = article
    .content
    .as_deref()
    .map(|html| html2text::from_read(html.as_bytes(), CONTENT_WIDTH))
    .or_else(|| article.text.clone())
    .unwrap_or_else(|| "(no content)".to_string());
  lines.extend(body.trim_end().lines().map(|l| Line::from(l.to_string())));

  Text::from(lines)
}

impl<S: OfflineStorage> View for ArticleView<S> {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Quit,
      KeyCode::Char('j') | KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
      KeyCode::Char('k') | KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
      KeyCode::Char('r') => self.reload(),
      KeyCode::Char('d') => self.remove(),
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Min(1),    // Article
        Constraint::Length(1), // Status bar
      ])
      .split(area);

    let state = self.store.state();
    let block = Block::default()
      .title(self.title(&state))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let paragraph = Paragraph::new(self.body(&state))
      .block(block)
      .wrap(Wrap { trim: false })
      .scroll((self.scroll, 0));
    frame.render_widget(paragraph, chunks[0]);

    let (content, style) = match &self.status {
      Some(message) if message.is_error => (message.text.clone(), Style::default().fg(Color::Red)),
      Some(message) => (message.text.clone(), Style::default().fg(Color::Green)),
      None => (
        " j/k:scroll  r:reload  d:remove offline  q:quit".to_string(),
        Style::default().fg(Color::DarkGray),
      ),
    };
    frame.render_widget(Paragraph::new(content).style(style), chunks[1]);
  }

  fn tick(&mut self) {
    while let Ok(message) = self.messages.try_recv() {
      self.status = Some(message);
    }
  }
}
