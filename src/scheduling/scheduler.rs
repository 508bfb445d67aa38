use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use teloxide::types::ChatId;
use tokio_util::sync::CancellationToken;

use crate::delivery::DeliveryChannel;
use crate::error::StorageError;
use crate::reminder::Reminder;
use crate::storage::ReminderStorage;

use super::digest::send_daily_digest;
use super::lead::due_leads;

/// Registers one-shot notification timers for reminders and drives the
/// daily digest loop. Timers are fire-and-forget: once registered they hold
/// only the chat id and the precomputed message text, never the reminder
/// itself. A process restart drops them, which is why `rehydrate` re-runs
/// registration for the whole store at boot.
pub struct ReminderScheduler {
    channel: Arc<dyn DeliveryChannel>,
    timezone: Tz,
    shutdown: CancellationToken,
}

impl ReminderScheduler {
    pub fn new(channel: Arc<dyn DeliveryChannel>, timezone: Tz) -> Self {
        Self {
            channel,
            timezone,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn local_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.timezone).naive_local()
    }

    /// Registers a timer for every lead of `reminder` that is still ahead of
    /// local now; past leads are silently skipped. Returns how many were
    /// registered.
    pub fn schedule_reminder(&self, reminder: &Reminder) -> usize {
        let now = self.local_now();
        let leads = due_leads(reminder, now);
        for (lead, fire_time) in &leads {
            let delay = (*fire_time - now)
                .to_std()
                .expect("due leads are strictly in the future");
            log::info!(
                "registering {lead:?} trigger for reminder {} at {fire_time}",
                reminder.id
            );
            self.spawn_one_shot(reminder.chat_id, lead.message(reminder), delay);
        }
        leads.len()
    }

    fn spawn_one_shot(&self, chat_id: ChatId, text: String, delay: std::time::Duration) {
        let channel = Arc::clone(&self.channel);
        let token = self.shutdown.child_token();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if let Err(error) = channel.send_message(chat_id, &text).await {
                        log::warn!("dropping notification: {error}");
                    }
                }
            }
        });
    }

    /// Re-registers timers for every stored reminder. Run once at startup so
    /// pending notifications survive a process restart.
    pub async fn rehydrate(&self, storage: &dyn ReminderStorage) -> Result<(), StorageError> {
        let reminders = storage.load_all().await?;
        let mut registered = 0;
        for reminder in &reminders {
            registered += self.schedule_reminder(reminder);
        }
        log::info!(
            "rehydrated {registered} triggers from {} stored reminders",
            reminders.len()
        );
        Ok(())
    }

    /// Starts the long-lived daily digest loop, firing at `digest_time` wall
    /// clock in the bot timezone.
    pub fn spawn_daily_digest(&self, storage: Arc<dyn ReminderStorage>, digest_time: NaiveTime) {
        let channel = Arc::clone(&self.channel);
        let timezone = self.timezone;
        let token = self.shutdown.child_token();
        tokio::spawn(async move {
            loop {
                let now = Utc::now().with_timezone(&timezone).naive_local();
                let next = next_daily_occurrence(now, digest_time);
                let delay = (next - now)
                    .to_std()
                    .expect("the next occurrence is strictly in the future");
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {
                        let today = Utc::now().with_timezone(&timezone).date_naive();
                        if let Err(error) = send_daily_digest(storage.as_ref(), channel.as_ref(), today).await {
                            log::error!("daily digest skipped: {error}");
                        }
                    }
                }
            }
        });
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// The next strictly-future instant whose wall-clock time is `at`.
pub(super) fn next_daily_occurrence(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today_run = now.date().and_time(at);
    if today_run > now {
        today_run
    } else {
        today_run
            .checked_add_signed(Duration::days(1))
            .expect("Not realistic to overflow")
    }
}
