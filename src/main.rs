mod appsettings;
mod delivery;
mod error;
mod reminder;
mod scheduling;
mod storage;
mod telegram;

use std::sync::Arc;

use anyhow::Context;
use teloxide::Bot;

use appsettings::AppSettings;
use delivery::{DeliveryChannel, TelegramDeliveryChannel};
use scheduling::ReminderScheduler;
use storage::{JsonFileStorage, ReminderStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = AppSettings::load().context("could not load configuration")?;
    let token = settings.resolve_token()?;
    let digest_time = settings.digest_time()?;

    let bot = Bot::new(token);
    let storage: Arc<dyn ReminderStorage> =
        Arc::new(JsonFileStorage::new(settings.storage.path.clone()));
    let channel: Arc<dyn DeliveryChannel> = Arc::new(TelegramDeliveryChannel::new(bot.clone()));
    let scheduler = Arc::new(ReminderScheduler::new(Arc::clone(&channel), settings.timezone));

    // Pending one-shot triggers live only in memory, so re-register them for
    // everything in the store on every boot.
    if let Err(error) = scheduler.rehydrate(storage.as_ref()).await {
        log::error!("skipping trigger rehydration: {error}");
    }
    scheduler.spawn_daily_digest(Arc::clone(&storage), digest_time);

    log::info!("bot is running, timezone {}", settings.timezone);
    telegram::run(bot, storage, Arc::clone(&scheduler), channel).await;

    scheduler.shutdown();
    Ok(())
}
