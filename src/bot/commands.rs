//! Command parsing.
//!
//! Commands are case-sensitive and must be the first token of the message.
//! `/quote@SomeBot` only counts when `SomeBot` is this bot.

/// A recognized user command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Quote,
    Subscribe,
    Unsubscribe,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::Start,
        Command::Help,
        Command::Quote,
        Command::Subscribe,
        Command::Unsubscribe,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Quote => "quote",
            Command::Subscribe => "subscribe",
            Command::Unsubscribe => "unsubscribe",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Command::Start => "start the bot",
            Command::Help => "show this list",
            Command::Quote => "get a random quote",
            Command::Subscribe => "receive a quote every day",
            Command::Unsubscribe => "stop the daily quote",
        }
    }

    /// Parse the leading command of `text`. Returns `None` for plain text,
    /// unknown commands, and commands addressed to another bot.
    pub fn parse(text: &str, bot_username: &str) -> Option<Self> {
        let head = text.split_whitespace().next()?;
        let head = head.strip_prefix('/')?;

        let name = match head.split_once('@') {
            Some((name, target)) if target.eq_ignore_ascii_case(bot_username) => name,
            Some(_) => return None,
            None => head,
        };

        Self::ALL.into_iter().find(|cmd| cmd.name() == name)
    }
}

/// Help text listing every command.
pub fn help_text() -> String {
    let mut text = String::from("These commands are supported:");
    for cmd in Command::ALL {
        text.push_str(&format!("\n/{} - {}", cmd.name(), cmd.description()));
    }
    text
}
