use async_trait::async_trait;

use crate::error::StorageError;
use crate::reminder::Reminder;

/// Flat persistence for reminders. There is no indexing and no query
/// surface: callers load the full collection and filter in memory.
#[async_trait]
pub trait ReminderStorage: Send + Sync {
    /// The full persisted collection; the empty vec when no backing file
    /// exists yet.
    async fn load_all(&self) -> Result<Vec<Reminder>, StorageError>;

    /// Overwrites the backing file with the given collection.
    async fn save_all(&self, reminders: &[Reminder]) -> Result<(), StorageError>;

    /// Load, push, save. Mutations are serialized so interleaved appends
    /// cannot drop each other's writes.
    async fn append(&self, reminder: Reminder) -> Result<(), StorageError>;
}
