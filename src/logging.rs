//! Logging setup: stdout, `<log_dir>/quotebot.log`, and optionally the
//! operator chat.
//!
//! The returned guard owns the file writer's worker. Lines still buffered
//! are written only when it is dropped, so fatal paths must return from
//! `main` instead of calling `process::exit`.

use std::path::Path;
use std::sync::Arc;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::bot::telegram::Messenger;
use crate::telegram_log::TelegramLogLayer;

pub const LOG_FILE: &str = "quotebot.log";

/// Open (appending) the log file under `log_dir`, creating the directory.
pub fn file_writer(log_dir: &Path) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(log_dir)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LOG_FILE))?;
    Ok(tracing_appender::non_blocking(file))
}

fn filter() -> EnvFilter {
    EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into())
}

/// Install the global subscriber. `operator` mirrors this crate's events
/// into a chat; it needs a running tokio runtime.
pub fn init(log_dir: &Path, operator: Option<(Arc<dyn Messenger>, i64)>) -> std::io::Result<WorkerGuard> {
    let (non_blocking, guard) = file_writer(log_dir)?;

    let registry = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(filter()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(filter()),
        );

    if let Some((sink, chat_id)) = operator {
        registry.with(TelegramLogLayer::new(sink, chat_id)).init();
    } else {
        registry.init();
    }

    Ok(guard)
}
