use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StorageError;
use crate::reminder::Reminder;

use super::ReminderStorage;

/// Reminders persisted as one pretty-printed JSON array. The whole file is
/// rewritten on every mutation; serde_json keeps non-ASCII characters
/// literal, so notes stay readable in the file. A crash mid-write can still
/// truncate the file; that limitation is accepted.
pub struct JsonFileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    fn path_display(&self) -> String {
        self.path.display().to_string()
    }

    async fn read_unlocked(&self) -> Result<Vec<Reminder>, StorageError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => {
                return Err(StorageError::Read {
                    path: self.path_display(),
                    source: error,
                });
            }
        };

        serde_json::from_str(&raw).map_err(|error| StorageError::Parse {
            path: self.path_display(),
            source: error,
        })
    }

    async fn write_unlocked(&self, reminders: &[Reminder]) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(reminders).map_err(|error| StorageError::Write {
            path: self.path_display(),
            source: std::io::Error::other(error),
        })?;

        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|error| StorageError::Write {
                path: self.path_display(),
                source: error,
            })
    }
}

#[async_trait]
impl ReminderStorage for JsonFileStorage {
    async fn load_all(&self) -> Result<Vec<Reminder>, StorageError> {
        // Readers take the lock too, or they could observe a half-written file.
        let _guard = self.write_lock.lock().await;
        self.read_unlocked().await
    }

    async fn save_all(&self, reminders: &[Reminder]) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        self.write_unlocked(reminders).await
    }

    async fn append(&self, reminder: Reminder) -> Result<(), StorageError> {
        // Hold the lock across the whole read-modify-write cycle.
        let _guard = self.write_lock.lock().await;
        let mut reminders = self.read_unlocked().await?;
        reminders.push(reminder);
        self.write_unlocked(&reminders).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use teloxide::types::ChatId;

    fn storage_in(dir: &tempfile::TempDir) -> JsonFileStorage {
        JsonFileStorage::new(dir.path().join("reminders.json"))
    }

    fn reminder(note: &str) -> Reminder {
        Reminder::new(
            ChatId(7),
            NaiveDate::from_ymd_opt(2025, 12, 25)
                .unwrap()
                .and_time(NaiveTime::from_hms_opt(18, 30, 0).unwrap()),
            note.to_string(),
        )
    }

    #[tokio::test]
    async fn load_all_returns_empty_when_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);

        assert_eq!(storage.load_all().await.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn append_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        let first = reminder("Dentist");
        let second = reminder("Buy gifts");

        storage.append(first.clone()).await.unwrap();
        storage.append(second.clone()).await.unwrap();

        assert_eq!(storage.load_all().await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn save_all_of_load_all_leaves_file_bytes_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        storage.append(reminder("Dentist")).await.unwrap();

        let path = dir.path().join("reminders.json");
        let before = std::fs::read_to_string(&path).unwrap();
        let reminders = storage.load_all().await.unwrap();
        storage.save_all(&reminders).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reminders.json");
        std::fs::write(&path, "not json at all").unwrap();
        let storage = JsonFileStorage::new(path);

        let error = storage.load_all().await.unwrap_err();
        assert!(matches!(error, StorageError::Parse { .. }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn interleaved_appends_and_reads_never_observe_partial_state() {
        let dir = tempfile::tempdir().unwrap();
        let storage = std::sync::Arc::new(storage_in(&dir));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let storage = std::sync::Arc::clone(&storage);
            handles.push(tokio::spawn(async move {
                storage.append(reminder("Dentist")).await.unwrap();
            }));
        }
        for _ in 0..10 {
            let storage = std::sync::Arc::clone(&storage);
            handles.push(tokio::spawn(async move {
                // Must never see a mid-write file, i.e. never a parse error.
                storage.load_all().await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(storage.load_all().await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn non_ascii_notes_are_stored_literally() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        storage.append(reminder("çay iç ☀️")).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("reminders.json")).unwrap();
        assert!(raw.contains("çay iç ☀️"), "expected literal utf-8, got {raw}");
    }
}
