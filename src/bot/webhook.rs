//! HTTP endpoint receiving Telegram webhook updates.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::{debug, warn};

use crate::bot::context::BotContext;
use crate::bot::update::InboundUpdate;

pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

const STATUS_PAGE: &str = "<h1>quotebot</h1><p>POST Telegram updates to this URL.</p>";

pub fn router(ctx: Arc<BotContext>) -> Router {
    Router::new()
        .route("/", get(status_page).post(receive_update))
        .with_state(ctx)
}

/// Compares in time independent of where the first mismatch is.
fn secret_matches(given: Option<&[u8]>, expected: &[u8]) -> bool {
    let Some(given) = given else {
        return false;
    };
    if given.len() != expected.len() {
        return false;
    }
    given.iter().zip(expected).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

async fn status_page() -> Html<&'static str> {
    Html(STATUS_PAGE)
}

async fn receive_update(
    State(ctx): State<Arc<BotContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(expected) = ctx.webhook_secret.as_deref() {
        let given = headers.get(SECRET_HEADER).map(|v| v.as_bytes());
        if !secret_matches(given, expected.as_bytes()) {
            warn!("Rejected webhook request with missing or wrong secret token");
            return (StatusCode::UNAUTHORIZED, "unauthorized").into_response();
        }
    }

    let update = match InboundUpdate::parse(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!("Rejected webhook body ({} bytes): {}", body.len(), e);
            return (StatusCode::BAD_REQUEST, "bad request").into_response();
        }
    };

    let preview: String = update.text.chars().take(100).collect();
    debug!("Update from chat {}: \"{}\"", update.chat_id, preview);

    // Telegram redelivers on non-2xx, so a parsed update is always answered OK.
    if let Err(e) = ctx.handle_text(update.chat_id, &update.text).await {
        warn!("Reply to chat {} failed: {}", update.chat_id, e);
    }

    (StatusCode::OK, "OK").into_response()
}
