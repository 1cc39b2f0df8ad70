use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use teloxide::prelude::*;
use tracing::{error, info, warn};

use quotebot::bot::{run_daily, webhook, BotContext, Messenger, QuoteStore, TelegramClient};
use quotebot::config::{Config, DeliveryMode};
use quotebot::logging;

/// Time the operator-chat forwarder gets to send a fatal error before exit.
const ALERT_GRACE: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let bot = Bot::new(&config.telegram_bot_token);
    let telegram = Arc::new(TelegramClient::new(bot.clone()));

    let operator = config
        .log_chat_id
        .map(|chat_id| (telegram.clone() as Arc<dyn Messenger>, chat_id.0));
    let guard = match logging::init(&config.log_dir, operator) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to set up logging in {}: {e}", config.log_dir.display());
            return ExitCode::FAILURE;
        }
    };

    let result = run(config, bot, telegram).await;
    if let Err(ref e) = result {
        error!("{e}");
        tokio::time::sleep(ALERT_GRACE).await;
    }

    drop(guard);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

async fn run(config: Config, bot: Bot, telegram: Arc<TelegramClient>) -> Result<(), String> {
    info!("Starting quotebot (@{})", config.bot_username);

    let quotes = QuoteStore::load(&config.quotes_path).map_err(|e| e.to_string())?;

    let ctx = Arc::new(
        BotContext::new(quotes, telegram.clone(), config.bot_username.clone())
            .with_webhook_secret(config.webhook_secret.clone()),
    );

    info!("Daily broadcast timezone: {}", config.broadcast.timezone());
    tokio::spawn(run_daily(config.broadcast.clone(), ctx.clone()));

    match config.delivery {
        DeliveryMode::Webhook => {
            if let Some(ref url) = config.webhook_url {
                telegram.set_webhook(url, config.webhook_secret.as_deref()).await?;
            }
            serve_webhook(config.port, ctx)
                .await
                .map_err(|e| format!("Webhook server failed: {e}"))?;
        }
        DeliveryMode::Polling => run_polling(bot, ctx).await,
    }

    info!("Shut down");
    Ok(())
}

async fn serve_webhook(port: u16, ctx: Arc<BotContext>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Listening for webhook updates on {}", listener.local_addr()?);

    axum::serve(listener, webhook::router(ctx))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for ctrl-c: {e}");
            }
        })
        .await
}

async fn run_polling(bot: Bot, ctx: Arc<BotContext>) {
    info!("Polling for updates");

    let handler = Update::filter_message().endpoint(handle_polled_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![ctx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_polled_message(msg: Message, ctx: Arc<BotContext>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    if let Err(e) = ctx.handle_text(msg.chat.id.0, text).await {
        warn!("Reply to chat {} failed: {e}", msg.chat.id);
    }

    Ok(())
}
