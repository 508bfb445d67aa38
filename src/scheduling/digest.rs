use std::collections::BTreeMap;

use chrono::NaiveDate;
use teloxide::types::ChatId;

use crate::delivery::DeliveryChannel;
use crate::error::StorageError;
use crate::reminder::Reminder;
use crate::storage::ReminderStorage;

const DIGEST_HEADER: &str = "☀️ Bugun ne var:\n";

/// One grouped message per recipient that has reminders due on `today`,
/// listing each as `HH:MM - note` sorted by time. Empty when nothing is due.
pub fn digest_messages(reminders: &[Reminder], today: NaiveDate) -> Vec<(ChatId, String)> {
    let mut per_chat: BTreeMap<i64, Vec<&Reminder>> = BTreeMap::new();
    for reminder in reminders {
        if reminder.event_time.date() == today {
            per_chat.entry(reminder.chat_id.0).or_default().push(reminder);
        }
    }

    per_chat
        .into_iter()
        .map(|(chat_id, mut matches)| {
            matches.sort_by_key(|r| r.event_time);
            let mut text = DIGEST_HEADER.to_string();
            for reminder in matches {
                text.push_str(&format!("  • {} - {}\n", reminder.time_display(), reminder.note));
            }
            (ChatId(chat_id), text)
        })
        .collect()
}

/// The daily digest routine. Silent when nothing is due today; delivery
/// failures are logged and the remaining recipients still get theirs.
pub async fn send_daily_digest(
    storage: &dyn ReminderStorage,
    channel: &dyn DeliveryChannel,
    today: NaiveDate,
) -> Result<(), StorageError> {
    let reminders = storage.load_all().await?;
    for (chat_id, text) in digest_messages(&reminders, today) {
        if let Err(error) = channel.send_message(chat_id, &text).await {
            log::warn!("skipping digest recipient: {error}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn reminder(chat: i64, d: u32, h: u32, m: u32, note: &str) -> Reminder {
        Reminder::new(
            ChatId(chat),
            NaiveDate::from_ymd_opt(2025, 12, d)
                .unwrap()
                .and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap()),
            note.to_string(),
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 25).unwrap()
    }

    #[test]
    fn same_recipient_gets_one_message_with_both_lines() {
        let reminders = vec![
            reminder(7, 25, 18, 30, "Buy gifts"),
            reminder(7, 25, 9, 0, "Dentist"),
        ];

        let messages = digest_messages(&reminders, today());

        assert_eq!(messages.len(), 1);
        let (chat_id, text) = &messages[0];
        assert_eq!(*chat_id, ChatId(7));
        assert_eq!(text, "☀️ Bugun ne var:\n  • 09:00 - Dentist\n  • 18:30 - Buy gifts\n");
    }

    #[test]
    fn recipients_are_grouped_separately() {
        let reminders = vec![
            reminder(7, 25, 10, 0, "Dentist"),
            reminder(8, 25, 11, 0, "Call mom"),
        ];

        let messages = digest_messages(&reminders, today());

        assert_eq!(messages.len(), 2);
        assert!(messages.iter().any(|(c, _)| *c == ChatId(7)));
        assert!(messages.iter().any(|(c, _)| *c == ChatId(8)));
    }

    #[test]
    fn other_days_are_filtered_out() {
        let reminders = vec![
            reminder(7, 24, 10, 0, "yesterday"),
            reminder(7, 26, 10, 0, "tomorrow"),
        ];

        assert!(digest_messages(&reminders, today()).is_empty());
    }

    #[test]
    fn empty_store_produces_no_messages() {
        assert!(digest_messages(&[], today()).is_empty());
    }
}
