use std::fmt;
use std::path::PathBuf;

use chrono_tz::Tz;
use teloxide::types::ChatId;

use crate::bot::broadcast::{DailySchedule, DEFAULT_CRON};

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A required variable is not set.
    Missing(&'static str),
    /// A variable is set but cannot be parsed.
    Invalid { name: &'static str, value: String, reason: String },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "environment variable {} is required", name),
            Self::Invalid { name, value, reason } => {
                write!(f, "invalid value '{}' for {}: {}", value, name, reason)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// How updates reach the bot. Exactly one runs per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Webhook,
    Polling,
}

pub struct Config {
    pub telegram_bot_token: String,
    /// Username without `@`, used to accept `/cmd@username`.
    pub bot_username: String,
    pub port: u16,
    pub quotes_path: PathBuf,
    pub delivery: DeliveryMode,
    /// Public URL registered with Telegram at startup (webhook mode only).
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub broadcast: DailySchedule,
    pub log_dir: PathBuf,
    /// Chat that receives mirrored log events.
    pub log_chat_id: Option<ChatId>,
}

const DEFAULT_BOT_USERNAME: &str = "HiMyNameIsBobBot";
const DEFAULT_PORT: u16 = 5000;

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let telegram_bot_token = get("TELEGRAM_BOT_KEY").ok_or(ConfigError::Missing("TELEGRAM_BOT_KEY"))?;
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = telegram_bot_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Validation(
                "TELEGRAM_BOT_KEY appears invalid (expected format: 123456789:ABCdefGHI...)".into(),
            ));
        }

        let bot_username = get("BOT_USERNAME")
            .map(|s| s.trim_start_matches('@').to_string())
            .unwrap_or_else(|| DEFAULT_BOT_USERNAME.to_string());

        let port = match get("PORT") {
            Some(v) => v.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                value: v.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let delivery = match get("DELIVERY_MODE").as_deref() {
            None | Some("webhook") => DeliveryMode::Webhook,
            Some("polling") => DeliveryMode::Polling,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "DELIVERY_MODE",
                    value: other.to_string(),
                    reason: "expected 'webhook' or 'polling'".into(),
                });
            }
        };

        let webhook_url = get("WEBHOOK_URL");
        if webhook_url.is_some() && delivery == DeliveryMode::Polling {
            return Err(ConfigError::Validation(
                "WEBHOOK_URL cannot be used with DELIVERY_MODE=polling".into(),
            ));
        }

        let tz = match get("BROADCAST_TZ") {
            Some(v) => v.parse::<Tz>().map_err(|e| ConfigError::Invalid {
                name: "BROADCAST_TZ",
                value: v.clone(),
                reason: e.to_string(),
            })?,
            None => Tz::UTC,
        };
        let cron = get("BROADCAST_CRON").unwrap_or_else(|| DEFAULT_CRON.to_string());
        let broadcast = DailySchedule::new(&cron, tz).map_err(|reason| ConfigError::Invalid {
            name: "BROADCAST_CRON",
            value: cron.clone(),
            reason,
        })?;

        let log_chat_id = match get("LOG_CHAT_ID") {
            Some(v) => Some(ChatId(v.parse::<i64>().map_err(|e| ConfigError::Invalid {
                name: "LOG_CHAT_ID",
                value: v.clone(),
                reason: e.to_string(),
            })?)),
            None => None,
        };

        Ok(Self {
            telegram_bot_token,
            bot_username,
            port,
            quotes_path: get("QUOTES_FILE").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("quotes.json")),
            delivery,
            webhook_url,
            webhook_secret: get("WEBHOOK_SECRET"),
            broadcast,
            log_dir: get("LOG_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("logs")),
            log_chat_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const TOKEN: &str = "123456789:ABCdefGHIjklMNOpqrsTUVwxyz";

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    fn assert_err<T>(result: Result<T, ConfigError>) -> ConfigError {
        match result {
            Ok(_) => panic!("expected error, got Ok"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("TELEGRAM_BOT_KEY", TOKEN)]).expect("should load");
        assert_eq!(config.port, 5000);
        assert_eq!(config.bot_username, "HiMyNameIsBobBot");
        assert_eq!(config.quotes_path, PathBuf::from("quotes.json"));
        assert_eq!(config.delivery, DeliveryMode::Webhook);
        assert_eq!(config.broadcast.timezone(), Tz::UTC);
        assert!(config.webhook_url.is_none());
        assert!(config.webhook_secret.is_none());
        assert!(config.log_chat_id.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("TELEGRAM_BOT_KEY", TOKEN),
            ("BOT_USERNAME", "@DailyBot"),
            ("PORT", "8080"),
            ("QUOTES_FILE", "/data/quotes.json"),
            ("DELIVERY_MODE", "polling"),
            ("WEBHOOK_SECRET", "s3cret"),
            ("BROADCAST_CRON", "0 30 7 * * * *"),
            ("BROADCAST_TZ", "Europe/Berlin"),
            ("LOG_CHAT_ID", "-100123"),
        ])
        .expect("should load");
        assert_eq!(config.bot_username, "DailyBot");
        assert_eq!(config.port, 8080);
        assert_eq!(config.quotes_path, PathBuf::from("/data/quotes.json"));
        assert_eq!(config.delivery, DeliveryMode::Polling);
        assert_eq!(config.webhook_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.broadcast.timezone(), chrono_tz::Europe::Berlin);
        assert_eq!(config.log_chat_id, Some(ChatId(-100123)));
    }

    #[test]
    fn test_missing_token() {
        let err = assert_err(load(&[]));
        assert!(matches!(err, ConfigError::Missing("TELEGRAM_BOT_KEY")));
    }

    #[test]
    fn test_empty_token_counts_as_missing() {
        let err = assert_err(load(&[("TELEGRAM_BOT_KEY", "  ")]));
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn test_invalid_token_format() {
        for token in ["invalid_token_no_colon", "notanumber:ABCdef", "123456789:"] {
            let err = assert_err(load(&[("TELEGRAM_BOT_KEY", token)]));
            assert!(matches!(err, ConfigError::Validation(_)), "token {token:?}");
        }
    }

    #[test]
    fn test_invalid_port() {
        let err = assert_err(load(&[("TELEGRAM_BOT_KEY", TOKEN), ("PORT", "eighty")]));
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
        assert!(err.to_string().contains("eighty"));
    }

    #[test]
    fn test_unknown_delivery_mode() {
        let err = assert_err(load(&[("TELEGRAM_BOT_KEY", TOKEN), ("DELIVERY_MODE", "both")]));
        assert!(matches!(err, ConfigError::Invalid { name: "DELIVERY_MODE", .. }));
    }

    #[test]
    fn test_webhook_url_with_polling() {
        let err = assert_err(load(&[
            ("TELEGRAM_BOT_KEY", TOKEN),
            ("DELIVERY_MODE", "polling"),
            ("WEBHOOK_URL", "https://example.com/"),
        ]));
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_invalid_cron() {
        let err = assert_err(load(&[("TELEGRAM_BOT_KEY", TOKEN), ("BROADCAST_CRON", "daily")]));
        assert!(matches!(err, ConfigError::Invalid { name: "BROADCAST_CRON", .. }));
    }

    #[test]
    fn test_invalid_timezone() {
        let err = assert_err(load(&[("TELEGRAM_BOT_KEY", TOKEN), ("BROADCAST_TZ", "Mars/Olympus")]));
        assert!(matches!(err, ConfigError::Invalid { name: "BROADCAST_TZ", .. }));
    }

    #[test]
    fn test_invalid_log_chat_id() {
        let err = assert_err(load(&[("TELEGRAM_BOT_KEY", TOKEN), ("LOG_CHAT_ID", "@ops")]));
        assert!(matches!(err, ConfigError::Invalid { name: "LOG_CHAT_ID", .. }));
    }
}
