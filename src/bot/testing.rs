//! Test doubles shared by the unit test suites.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::bot::telegram::Messenger;

/// Messenger that records every send and fails for selected chats.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(i64, String)>>,
    failing: HashSet<i64>,
}

impl RecordingMessenger {
    pub fn failing(ids: &[i64]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: ids.iter().copied().collect(),
        }
    }

    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), String> {
        if self.failing.contains(&chat_id) {
            return Err(format!("chat {chat_id} blocked the bot"));
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}
