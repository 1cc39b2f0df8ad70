//! Daily quote broadcast.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use tracing::{error, info, warn};

use crate::bot::context::BotContext;
use crate::bot::quotes::QuoteError;

/// Default schedule: every day at 08:00.
pub const DEFAULT_CRON: &str = "0 0 8 * * * *";

/// Cron schedule evaluated in a fixed time zone.
#[derive(Debug, Clone)]
pub struct DailySchedule {
    schedule: Schedule,
    tz: Tz,
}

impl DailySchedule {
    /// `expr` uses the 7-field format: sec min hour day month dow year.
    pub fn new(expr: &str, tz: Tz) -> Result<Self, String> {
        let schedule = Schedule::from_str(expr).map_err(|e| format!("Invalid cron '{}': {}", expr, e))?;
        Ok(Self { schedule, tz })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// First occurrence strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Tz>> {
        self.schedule.after(&after.with_timezone(&self.tz)).next()
    }
}

/// Outcome of one broadcast run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: Vec<(i64, String)>,
}

/// Send one random quote to every current subscriber.
///
/// A failed send is recorded and the loop moves on to the next subscriber.
/// An empty quote store aborts before anything is sent.
pub async fn broadcast(ctx: &BotContext) -> Result<BroadcastReport, QuoteError> {
    if ctx.quotes.is_empty() {
        return Err(QuoteError::Empty);
    }

    let subscribers = ctx.subscribers.list().await;
    info!("Broadcasting to {} subscriber(s)", subscribers.len());

    let mut report = BroadcastReport::default();
    for chat_id in subscribers {
        let quote = ctx.quotes.random_quote()?;
        match ctx.messenger.send_message(chat_id, quote).await {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                warn!("Broadcast to chat {} failed: {}", chat_id, e);
                report.failed.push((chat_id, e));
            }
        }
    }

    Ok(report)
}

/// Sleep until each scheduled time and broadcast. Runs forever unless the
/// schedule has no future occurrence.
pub async fn run_daily(schedule: DailySchedule, ctx: Arc<BotContext>) {
    loop {
        let now = Utc::now();
        let Some(next) = schedule.next_after(now) else {
            error!("Broadcast schedule has no future occurrence, stopping");
            return;
        };

        let wait = (next.with_timezone(&Utc) - now).to_std().unwrap_or_default();
        info!("Next broadcast at {} (in {}s)", next, wait.as_secs());
        tokio::time::sleep(wait).await;

        match broadcast(&ctx).await {
            Ok(report) if report.failed.is_empty() => {
                info!("Broadcast delivered to {} chat(s)", report.delivered);
            }
            Ok(report) => {
                warn!(
                    "Broadcast delivered to {} chat(s), {} failed",
                    report.delivered,
                    report.failed.len()
                );
            }
            Err(e) => error!("Broadcast skipped: {}", e),
        }
    }
}
