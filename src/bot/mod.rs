//! Quote bot - commands, subscriptions and the daily broadcast.

pub mod broadcast;
pub mod commands;
pub mod context;
pub mod quotes;
pub mod subscribers;
pub mod telegram;
pub mod update;
pub mod webhook;

#[cfg(test)]
pub(crate) mod testing;

pub use broadcast::{broadcast, run_daily, BroadcastReport, DailySchedule};
pub use commands::Command;
pub use context::BotContext;
pub use quotes::{Quote, QuoteError, QuoteStore};
pub use subscribers::SubscriberRegistry;
pub use telegram::{Messenger, TelegramClient};
pub use update::{InboundUpdate, UpdateError};
