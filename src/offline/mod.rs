//! Articles kept locally so they stay readable without connectivity.

mod notify;
mod storage;
mod store;

pub use notify::{ChannelNotifier, ConsoleNotifier, Message};
pub use storage::{OfflineStorage, SqliteStorage};
pub use store::{OfflineState, OfflineStore, Selected};

#[cfg(test)]
pub use storage::MemoryStorage;
