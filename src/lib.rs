//! Telegram bot serving canned quotes and a daily quote broadcast.

pub mod bot;
pub mod config;
pub mod logging;
pub mod telegram_log;
