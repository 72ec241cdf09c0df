use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// Actions that a view can request in response to user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
  /// No action needed
  None,
  /// Leave the UI
  Quit,
}

/// Trait for view behavior
///
/// Views that load data asynchronously read a state snapshot on every
/// render and poll their message channels in `tick()`.
pub trait View {
  /// Handle a key event, returning an action for the event loop to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Called on each tick to allow views to poll async results
  fn tick(&mut self) {}
}
