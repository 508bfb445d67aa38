use chrono::{Duration, NaiveDateTime};

use crate::reminder::Reminder;

/// Fixed offsets before an event at which a one-shot notification fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lead {
    DayBefore,
    HourBefore,
    AtEventTime,
}

impl Lead {
    pub const ALL: [Lead; 3] = [Lead::DayBefore, Lead::HourBefore, Lead::AtEventTime];

    pub fn offset(self) -> Duration {
        match self {
            Lead::DayBefore => Duration::days(1),
            Lead::HourBefore => Duration::hours(1),
            Lead::AtEventTime => Duration::zero(),
        }
    }

    pub fn fire_time(self, event_time: NaiveDateTime) -> NaiveDateTime {
        event_time - self.offset()
    }

    /// The notification text, fixed at registration time.
    pub fn message(self, reminder: &Reminder) -> String {
        match self {
            Lead::DayBefore => {
                format!("Yarin: {}\n{}", reminder.note, reminder.event_display())
            }
            Lead::HourBefore => {
                format!("1 saat sonra: {}\n{}", reminder.note, reminder.event_display())
            }
            Lead::AtEventTime => format!("Simdi: {}", reminder.note),
        }
    }
}

/// The leads whose fire time is strictly in the future at `now`, paired with
/// that fire time. Leads already in the past are skipped for good; there is
/// no backfill.
pub fn due_leads(reminder: &Reminder, now: NaiveDateTime) -> Vec<(Lead, NaiveDateTime)> {
    Lead::ALL
        .iter()
        .map(|lead| (*lead, lead.fire_time(reminder.event_time)))
        .filter(|(_, fire_time)| *fire_time > now)
        .collect()
}
