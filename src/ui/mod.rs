mod article_view;
mod renderfns;
mod view;

pub use article_view::ArticleView;
pub use renderfns::truncate;
pub use view::{View, ViewAction};

use color_eyre::Result;
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;

use crate::event::{Event, EventHandler};

/// Run `view` full screen until it asks to quit.
pub async fn run(view: &mut impl View) -> Result<()> {
  // Setup terminal
  enable_raw_mode()?;
  stdout().execute(EnterAlternateScreen)?;

  let result = event_loop(view).await;

  // Cleanup terminal, even when the loop failed
  disable_raw_mode()?;
  stdout().execute(LeaveAlternateScreen)?;

  result
}

async fn event_loop(view: &mut impl View) -> Result<()> {
  let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
  let mut events = EventHandler::new(Duration::from_millis(250));

  loop {
    terminal.draw(|frame| {
      let area = frame.area();
      view.render(frame, area);
    })?;

    match events.next().await {
      Some(Event::Key(key)) => {
        if view.handle_key(key) == ViewAction::Quit {
          return Ok(());
        }
      }
      Some(Event::Tick) => view.tick(),
      None => return Ok(()),
    }
  }
}
