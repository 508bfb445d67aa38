use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use teloxide::types::ChatId;
use uuid::Uuid;

/// A persisted reminder: who to notify, when the event is due, and the note
/// to deliver. `event_time` is naive local time in the bot's timezone; its
/// ISO-8601 serialization keeps chronological order under string sort, which
/// the day-prefix filters rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    pub chat_id: ChatId,
    pub event_time: NaiveDateTime,
    pub note: String,
}

impl Reminder {
    pub fn new(chat_id: ChatId, event_time: NaiveDateTime, note: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            chat_id,
            event_time,
            note,
        }
    }

    /// Full event time as shown to the user, e.g. `25.12.2025 18:30`.
    pub fn event_display(&self) -> String {
        self.event_time.format("%d.%m.%Y %H:%M").to_string()
    }

    /// Wall-clock time only, e.g. `18:30`.
    pub fn time_display(&self) -> String {
        self.event_time.format("%H:%M").to_string()
    }
}
