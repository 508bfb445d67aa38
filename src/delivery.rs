use async_trait::async_trait;
use teloxide::prelude::*;

use crate::error::DeliveryError;

/// Outbound side of the bot: pushes a text message to a chat outside of any
/// command exchange. Schedulers and the digest go through this seam so tests
/// can swap in a recording channel.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), DeliveryError>;
}

pub struct TelegramDeliveryChannel {
    bot: Bot,
}

impl TelegramDeliveryChannel {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl DeliveryChannel for TelegramDeliveryChannel {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), DeliveryError> {
        self.bot
            .send_message(chat_id, text)
            .await
            .map_err(|source| DeliveryError { chat_id, source })?;
        Ok(())
    }
}
