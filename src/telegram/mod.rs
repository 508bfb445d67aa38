mod parse;

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use teloxide::{
    dispatching::UpdateHandler,
    dptree::{self, case},
    macros::BotCommands,
    prelude::*,
};

use crate::delivery::DeliveryChannel;
use crate::reminder::Reminder;
use crate::scheduling::{ReminderScheduler, send_daily_digest};
use crate::storage::ReminderStorage;

use parse::parse_add_args;

type HandlerResult = anyhow::Result<()>;

const USAGE: &str = "Kullanim: /ekle <gun.ay[.yil]> [saat:dakika] <not>";
const STORE_READ_FAILED: &str = "Hatirlatici dosyasi okunamadi.";

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Desteklenen komutlar:")]
enum Command {
    #[command(description = "botu baslat")]
    Start,
    #[command(description = "hatirlatici ekle: /ekle <gun.ay[.yil]> [saat:dakika] <not>")]
    Ekle(String),
    #[command(description = "gelecek hatirlaticilari listele")]
    Liste,
    #[command(description = "bugunun hatirlaticilarini goster")]
    Bugun,
    #[command(description = "sabah ozetini hemen gonder")]
    Test,
}

pub fn schema() -> UpdateHandler<anyhow::Error> {
    Update::filter_message().branch(
        teloxide::filter_command::<Command, _>()
            .branch(case![Command::Start].endpoint(start))
            .branch(case![Command::Ekle(args)].endpoint(add_reminder))
            .branch(case![Command::Liste].endpoint(list_future))
            .branch(case![Command::Bugun].endpoint(list_today))
            .branch(case![Command::Test].endpoint(force_digest)),
    )
}

pub async fn run(
    bot: Bot,
    storage: Arc<dyn ReminderStorage>,
    scheduler: Arc<ReminderScheduler>,
    channel: Arc<dyn DeliveryChannel>,
) {
    log::info!("starting Telegram dispatcher");
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![storage, scheduler, channel])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn start(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, "Merhaba! Hatirlatici bot devrede.")
        .await?;
    Ok(())
}

async fn add_reminder(
    bot: Bot,
    msg: Message,
    args: String,
    storage: Arc<dyn ReminderStorage>,
    scheduler: Arc<ReminderScheduler>,
) -> HandlerResult {
    let (event_time, note) = match parse_add_args(&args, scheduler.local_now()) {
        Ok(parsed) => parsed,
        Err(error) => {
            bot.send_message(msg.chat.id, format!("{error}\n{USAGE}"))
                .await?;
            return Ok(());
        }
    };

    let reminder = Reminder::new(msg.chat.id, event_time, note);
    if let Err(error) = storage.append(reminder.clone()).await {
        log::error!("could not persist reminder: {error}");
        bot.send_message(msg.chat.id, "Hatirlatici kaydedilemedi.")
            .await?;
        return Ok(());
    }

    scheduler.schedule_reminder(&reminder);
    bot.send_message(msg.chat.id, ekle_reply(&reminder)).await?;
    Ok(())
}

async fn list_future(
    bot: Bot,
    msg: Message,
    storage: Arc<dyn ReminderStorage>,
    scheduler: Arc<ReminderScheduler>,
) -> HandlerResult {
    match storage.load_all().await {
        Ok(reminders) => {
            bot.send_message(msg.chat.id, liste_reply(&reminders, scheduler.local_now()))
                .await?;
        }
        Err(error) => {
            log::error!("/liste failed: {error}");
            bot.send_message(msg.chat.id, STORE_READ_FAILED).await?;
        }
    }
    Ok(())
}

async fn list_today(
    bot: Bot,
    msg: Message,
    storage: Arc<dyn ReminderStorage>,
    scheduler: Arc<ReminderScheduler>,
) -> HandlerResult {
    match storage.load_all().await {
        Ok(reminders) => {
            bot.send_message(msg.chat.id, bugun_reply(&reminders, scheduler.local_now().date()))
                .await?;
        }
        Err(error) => {
            log::error!("/bugun failed: {error}");
            bot.send_message(msg.chat.id, STORE_READ_FAILED).await?;
        }
    }
    Ok(())
}

async fn force_digest(
    bot: Bot,
    msg: Message,
    storage: Arc<dyn ReminderStorage>,
    scheduler: Arc<ReminderScheduler>,
    channel: Arc<dyn DeliveryChannel>,
) -> HandlerResult {
    let today = scheduler.local_now().date();
    match send_daily_digest(storage.as_ref(), channel.as_ref(), today).await {
        Ok(()) => {
            bot.send_message(msg.chat.id, "Sabah ozeti gonderildi (test).")
                .await?;
        }
        Err(error) => {
            log::error!("/test digest failed: {error}");
            bot.send_message(msg.chat.id, STORE_READ_FAILED).await?;
        }
    }
    Ok(())
}

/// Confirmation for a freshly added reminder, echoing the parsed date/time
/// and note.
fn ekle_reply(reminder: &Reminder) -> String {
    format!(
        "Kaydedildi!\nNe zaman: {}\nNot: {}",
        reminder.event_display(),
        reminder.note
    )
}

/// Future reminders, closest first, as one numbered message.
fn liste_reply(reminders: &[Reminder], now: NaiveDateTime) -> String {
    if reminders.is_empty() {
        return "Hic hatirlatici yok.".to_string();
    }

    let mut future: Vec<&Reminder> = reminders.iter().filter(|r| r.event_time > now).collect();
    if future.is_empty() {
        return "Gelecek hatirlatici yok.".to_string();
    }
    future.sort_by_key(|r| r.event_time);

    let mut text = String::from("Hatirlaticilar:\n");
    for (i, reminder) in future.iter().enumerate() {
        text.push_str(&format!(
            "{}. {} - {}\n",
            i + 1,
            reminder.event_display(),
            reminder.note
        ));
    }
    text
}

/// Today's reminders as a bulleted message, unlike the digest this replies
/// even when nothing is due.
fn bugun_reply(reminders: &[Reminder], today: NaiveDate) -> String {
    let mut todays: Vec<&Reminder> = reminders
        .iter()
        .filter(|r| r.event_time.date() == today)
        .collect();
    if todays.is_empty() {
        return "Bugun hicbir sey yok.".to_string();
    }
    todays.sort_by_key(|r| r.event_time);

    let mut text = String::from("Bugun:\n");
    for reminder in todays {
        text.push_str(&format!("  • {} - {}\n", reminder.time_display(), reminder.note));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use teloxide::types::ChatId;

    fn reminder(d: u32, h: u32, note: &str) -> Reminder {
        Reminder::new(
            ChatId(1),
            NaiveDate::from_ymd_opt(2025, 12, d)
                .unwrap()
                .and_time(NaiveTime::from_hms_opt(h, 0, 0).unwrap()),
            note.to_string(),
        )
    }

    fn now(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 12, d)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(h, 0, 0).unwrap())
    }

    #[test]
    fn ekle_confirmation_echoes_the_parsed_date_time_and_note() {
        let now = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        let (event_time, note) = parse_add_args("25.12 18:30 Buy gifts", now).unwrap();
        let reminder = Reminder::new(ChatId(1), event_time, note);

        assert_eq!(
            ekle_reply(&reminder),
            "Kaydedildi!\nNe zaman: 25.12.2025 18:30\nNot: Buy gifts"
        );
    }

    #[test]
    fn liste_is_sorted_and_excludes_past_reminders() {
        let reminders = vec![
            reminder(27, 10, "later"),
            reminder(20, 10, "already past"),
            reminder(26, 10, "sooner"),
        ];

        assert_eq!(
            liste_reply(&reminders, now(25, 12)),
            "Hatirlaticilar:\n1. 26.12.2025 10:00 - sooner\n2. 27.12.2025 10:00 - later\n"
        );
    }

    #[test]
    fn liste_distinguishes_empty_store_from_no_future_reminders() {
        assert_eq!(liste_reply(&[], now(25, 12)), "Hic hatirlatici yok.");
        assert_eq!(
            liste_reply(&[reminder(20, 10, "past")], now(25, 12)),
            "Gelecek hatirlatici yok."
        );
    }

    #[test]
    fn a_reminder_due_exactly_now_is_not_listed() {
        assert_eq!(
            liste_reply(&[reminder(25, 12, "now")], now(25, 12)),
            "Gelecek hatirlatici yok."
        );
    }

    #[test]
    fn bugun_lists_only_todays_reminders_sorted_by_time() {
        let reminders = vec![
            reminder(25, 14, "Dentist"),
            reminder(26, 9, "tomorrow"),
            reminder(25, 9, "Standup"),
        ];

        assert_eq!(
            bugun_reply(&reminders, NaiveDate::from_ymd_opt(2025, 12, 25).unwrap()),
            "Bugun:\n  • 09:00 - Standup\n  • 14:00 - Dentist\n"
        );
    }

    #[test]
    fn bugun_replies_even_when_nothing_is_due() {
        assert_eq!(
            bugun_reply(&[], NaiveDate::from_ymd_opt(2025, 12, 25).unwrap()),
            "Bugun hicbir sey yok."
        );
    }

    #[test]
    fn bugun_formats_a_single_entry() {
        let reminders = vec![reminder(25, 14, "Dentist")];
        assert_eq!(
            bugun_reply(&reminders, NaiveDate::from_ymd_opt(2025, 12, 25).unwrap()),
            "Bugun:\n  • 14:00 - Dentist\n"
        );
    }
}
