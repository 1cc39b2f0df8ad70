//! Inbound update schema.
//!
//! Only text messages are accepted. Anything without `message.chat.id`
//! and `message.text` is rejected instead of guessed at.

use std::fmt;

use serde::Deserialize;

#[derive(Deserialize)]
struct RawUpdate {
    message: RawMessage,
}

#[derive(Deserialize)]
struct RawMessage {
    chat: RawChat,
    text: String,
    from: Option<RawUser>,
}

#[derive(Deserialize)]
struct RawChat {
    id: i64,
}

#[derive(Deserialize)]
struct RawUser {
    id: i64,
}

/// One validated inbound text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundUpdate {
    pub chat_id: i64,
    pub text: String,
    /// Sender user id, when the platform includes it.
    pub from_id: Option<i64>,
}

#[derive(Debug)]
pub enum UpdateError {
    /// Body is not JSON or lacks the required fields.
    Shape(serde_json::Error),
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape(e) => write!(f, "unrecognized update shape: {e}"),
        }
    }
}

impl std::error::Error for UpdateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Shape(e) => Some(e),
        }
    }
}

impl InboundUpdate {
    pub fn parse(body: &[u8]) -> Result<Self, UpdateError> {
        let raw: RawUpdate = serde_json::from_slice(body).map_err(UpdateError::Shape)?;
        Ok(Self {
            chat_id: raw.message.chat.id,
            text: raw.message.text,
            from_id: raw.message.from.map(|u| u.id),
        })
    }
}
