//! Shared bot state and the per-message handler.

use std::sync::Arc;

use tracing::{error, info};

use crate::bot::commands::{help_text, Command};
use crate::bot::quotes::QuoteStore;
use crate::bot::subscribers::SubscriberRegistry;
use crate::bot::telegram::Messenger;

/// Reply to any text that is not a command.
pub const WELCOME_TEXT: &str = "Hello! You will receive daily quotes.";
pub const START_TEXT: &str = "Welcome! You will receive daily quotes.";
pub const SUBSCRIBED_TEXT: &str = "You have subscribed to daily quotes.";
pub const ALREADY_SUBSCRIBED_TEXT: &str = "You are already subscribed.";
pub const UNSUBSCRIBED_TEXT: &str = "You have unsubscribed from daily quotes.";
pub const NOT_SUBSCRIBED_TEXT: &str = "You are not subscribed.";
pub const NO_QUOTES_TEXT: &str = "No quotes are available right now.";

/// Everything a handler needs. Shared as `Arc<BotContext>` between the
/// delivery mode and the broadcast task.
pub struct BotContext {
    pub quotes: QuoteStore,
    pub subscribers: SubscriberRegistry,
    pub messenger: Arc<dyn Messenger>,
    pub bot_username: String,
    /// Expected `X-Telegram-Bot-Api-Secret-Token` on webhook requests.
    pub webhook_secret: Option<String>,
}

impl BotContext {
    pub fn new(quotes: QuoteStore, messenger: Arc<dyn Messenger>, bot_username: impl Into<String>) -> Self {
        Self {
            quotes,
            subscribers: SubscriberRegistry::new(),
            messenger,
            bot_username: bot_username.into(),
            webhook_secret: None,
        }
    }

    pub fn with_webhook_secret(mut self, secret: Option<String>) -> Self {
        self.webhook_secret = secret;
        self
    }

    /// Handle one inbound text message: commands are executed, anything
    /// else gets the welcome reply. Exactly one message is sent back.
    pub async fn handle_text(&self, chat_id: i64, text: &str) -> Result<(), String> {
        let reply = match Command::parse(text, &self.bot_username) {
            Some(cmd) => {
                info!("/{} from chat {}", cmd.name(), chat_id);
                self.execute(cmd, chat_id).await
            }
            None => WELCOME_TEXT.to_string(),
        };
        self.messenger.send_message(chat_id, &reply).await
    }

    /// Run a command for `chat_id` and return the reply text.
    pub async fn execute(&self, cmd: Command, chat_id: i64) -> String {
        match cmd {
            Command::Start => START_TEXT.to_string(),
            Command::Help => help_text(),
            Command::Quote => match self.quotes.random_quote() {
                Ok(text) => text.to_string(),
                Err(e) => {
                    error!("Cannot answer /quote for chat {}: {}", chat_id, e);
                    NO_QUOTES_TEXT.to_string()
                }
            },
            Command::Subscribe => {
                if self.subscribers.subscribe(chat_id).await {
                    info!("Chat {} subscribed ({} total)", chat_id, self.subscribers.len().await);
                    SUBSCRIBED_TEXT.to_string()
                } else {
                    ALREADY_SUBSCRIBED_TEXT.to_string()
                }
            }
            Command::Unsubscribe => {
                if self.subscribers.unsubscribe(chat_id).await {
                    info!("Chat {} unsubscribed ({} left)", chat_id, self.subscribers.len().await);
                    UNSUBSCRIBED_TEXT.to_string()
                } else {
                    NOT_SUBSCRIBED_TEXT.to_string()
                }
            }
        }
    }
}
