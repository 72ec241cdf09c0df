//! User-facing messages emitted after offline operations.

use tokio::sync::mpsc;
use tracing::{info, warn};

/// A message for the user, either a confirmation or a failure description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
  pub text: String,
  pub is_error: bool,
}

impl Message {
  pub fn info(text: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      is_error: false,
    }
  }

  pub fn error(text: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      is_error: true,
    }
  }
}

/// Fire-and-forget sink for user messages.
///
/// Implementations must not block; delivery failures are dropped.
pub trait Notifier: Send + Sync {
  fn notify(&self, message: Message);
}

/// Writes messages to the log only.
pub struct LogNotifier;

impl Notifier for LogNotifier {
  fn notify(&self, message: Message) {
    if message.is_error {
      warn!(message = %message.text, "offline operation failed");
    } else {
      info!(message = %message.text, "offline operation done");
    }
  }
}

/// Prints messages for command-line use: confirmations to stdout, failures
/// to stderr.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
  fn notify(&self, message: Message) {
    LogNotifier.notify(message.clone());
    if message.is_error {
      eprintln!("Error: {}", message.text);
    } else {
      println!("{}", message.text);
    }
  }
}

/// Forwards messages to a channel, e.g. the TUI status line.
pub struct ChannelNotifier {
  tx: mpsc::UnboundedSender<Message>,
}

impl ChannelNotifier {
  pub fn new() -> (Self, mpsc::UnboundedReceiver<Message>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Self { tx }, rx)
  }
}

impl Notifier for ChannelNotifier {
  fn notify(&self, message: Message) {
    // Ignore send errors - receiver may have been dropped
    let _ = self.tx.send(message);
  }
}
