//! Forwards this crate's log events to an operator chat.
//!
//! WARN and ERROR are delivered as soon as they happen. INFO lines are
//! collected and sent together on each flush tick, or earlier once a batch
//! fills up. Events from other crates (teloxide, hyper, ...) are not
//! forwarded.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::bot::telegram::Messenger;

pub const FLUSH_INTERVAL: Duration = Duration::from_secs(5);
pub const MAX_BATCH: usize = 50;
/// Telegram rejects messages over 4096 chars.
const MAX_CHARS: usize = 4000;
const FORWARDED_TARGET: &str = "quotebot";

enum Entry {
    Alert(String),
    Info(String),
}

/// INFO lines waiting for the next flush.
#[derive(Default)]
struct Batch {
    lines: Vec<String>,
}

impl Batch {
    /// Adds a line; returns the whole batch once it reaches `MAX_BATCH`.
    fn push(&mut self, line: String) -> Option<String> {
        self.lines.push(line);
        if self.lines.len() >= MAX_BATCH { self.take() } else { None }
    }

    fn take(&mut self) -> Option<String> {
        if self.lines.is_empty() {
            return None;
        }
        let joined = self.lines.join("\n");
        self.lines.clear();
        Some(joined)
    }
}

pub struct TelegramLogLayer {
    tx: mpsc::UnboundedSender<Entry>,
}

impl TelegramLogLayer {
    /// Must be called inside a tokio runtime.
    pub fn new(sink: Arc<dyn Messenger>, chat_id: i64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(forward(sink, chat_id, rx));
        Self { tx }
    }
}

async fn forward(sink: Arc<dyn Messenger>, chat_id: i64, mut rx: mpsc::UnboundedReceiver<Entry>) {
    let mut batch = Batch::default();
    let mut ticker = interval_at(Instant::now() + FLUSH_INTERVAL, FLUSH_INTERVAL);

    loop {
        let outgoing = tokio::select! {
            entry = rx.recv() => match entry {
                Some(Entry::Alert(text)) => Some(text),
                Some(Entry::Info(line)) => batch.push(line),
                None => {
                    if let Some(text) = batch.take() {
                        deliver(sink.as_ref(), chat_id, &text).await;
                    }
                    return;
                }
            },
            _ = ticker.tick() => batch.take(),
        };

        if let Some(text) = outgoing {
            deliver(sink.as_ref(), chat_id, &text).await;
        }
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() > MAX_CHARS {
        let head: String = text.chars().take(MAX_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

async fn deliver(sink: &dyn Messenger, chat_id: i64, text: &str) {
    // No tracing here: the event would come back through this layer.
    if let Err(e) = sink.send_message(chat_id, &truncate(text)).await {
        eprintln!("Failed to forward log to chat {chat_id}: {e}");
    }
}

/// Renders `message` first, then other fields as `key=value`.
#[derive(Default)]
struct EventText {
    message: String,
    fields: Vec<String>,
}

impl Visit for EventText {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

impl EventText {
    fn render(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.join(" ")
        } else {
            format!("{} {}", self.message, self.fields.join(" "))
        }
    }
}

impl<S: Subscriber> Layer<S> for TelegramLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let level = *meta.level();
        if level > Level::INFO || !meta.target().starts_with(FORWARDED_TARGET) {
            return;
        }

        let mut text = EventText::default();
        event.record(&mut text);
        let line = text.render();

        let entry = match level {
            Level::ERROR | Level::WARN => Entry::Alert(format!("{} {}: {}", level, meta.target(), line)),
            _ => Entry::Info(line),
        };

        if self.tx.send(entry).is_err() {
            eprintln!("Operator log channel closed, event dropped");
        }
    }
}
