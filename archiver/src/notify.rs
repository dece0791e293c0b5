//! One-shot Telegram notification for run outcomes.

use teloxide::prelude::*;
use teloxide::types::ChatId;
use tracing::{info, warn};

/// Fire-and-forget Telegram sink. Disabled entirely unless both the bot
/// token and the chat id are configured; delivery failure is logged and
/// never propagated.
pub struct Notifier {
    bot: Bot,
    chat_id: ChatId,
}

impl Notifier {
    pub fn from_config(token: Option<&str>, chat_id: Option<i64>) -> Option<Self> {
        match (token, chat_id) {
            (Some(token), Some(chat_id)) => Some(Self {
                bot: Bot::new(token),
                chat_id: ChatId(chat_id),
            }),
            _ => None,
        }
    }

    pub async fn send(&self, text: &str) {
        match self.bot.send_message(self.chat_id, text).await {
            Ok(_) => info!("notification sent to chat {}", self.chat_id),
            Err(e) => warn!("failed to send notification: {}", e),
        }
    }
}
