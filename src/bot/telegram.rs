//! Outbound messaging: the `Messenger` port and its teloxide implementation.

use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::{debug, info};

/// Anything that can deliver a text message to a chat.
///
/// Implementations return failures without logging them; callers decide.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), String>;
}

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Register `url` as the webhook, optionally with a secret token that
    /// Telegram echoes back in every request.
    pub async fn set_webhook(&self, url: &str, secret: Option<&str>) -> Result<(), String> {
        let url = reqwest::Url::parse(url).map_err(|e| format!("Invalid webhook URL '{url}': {e}"))?;
        info!("Registering webhook {}", url);

        let mut request = self.bot.set_webhook(url);
        if let Some(secret) = secret {
            request = request.secret_token(secret.to_string());
        }

        request.await.map(|_| ()).map_err(|e| format!("Failed to set webhook: {e}"))
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), String> {
        debug!("Sending {} chars to chat {}", text.len(), chat_id);
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .map(|_| ())
            .map_err(|e| format!("Failed to send to chat {chat_id}: {e}"))
    }
}
