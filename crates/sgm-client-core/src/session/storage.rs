//! Durable key/value storage shared by every session handle on a machine

use std::fmt::Debug;

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// A value for `key` was written (or removed when `new_value` is `None`)
/// through some other handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub new_value: Option<String>,
}

/// String keyed storage that outlives the process
///
/// Every handle sees the writes of every other handle. Writes made through a
/// handle are never reported back to that same handle as foreign changes.
pub trait KeyValueStorage: Debug + Send {
    fn get_item(&mut self, key: &str) -> anyhow::Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    /// Removing a key that is not present is not an error
    fn remove_item(&mut self, key: &str) -> anyhow::Result<()>;
    /// Drains the changes to `key` made through other handles since the last
    /// call, oldest first
    ///
    /// Only keys this handle has already used are tracked
    fn take_foreign_changes(&mut self, key: &str) -> anyhow::Result<Vec<StorageEvent>>;
}
