//! In-memory registry of chats subscribed to the daily broadcast.

use std::collections::BTreeSet;

use tokio::sync::Mutex;

/// Set of subscribed chat ids. Lost on restart.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    ids: Mutex<BTreeSet<i64>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the id was not subscribed before.
    pub async fn subscribe(&self, id: i64) -> bool {
        self.ids.lock().await.insert(id)
    }

    /// Returns true if the id was subscribed and has been removed.
    pub async fn unsubscribe(&self, id: i64) -> bool {
        self.ids.lock().await.remove(&id)
    }

    /// Snapshot of all subscribers in ascending order.
    pub async fn list(&self) -> Vec<i64> {
        self.ids.lock().await.iter().copied().collect()
    }

    pub async fn contains(&self, id: i64) -> bool {
        self.ids.lock().await.contains(&id)
    }

    pub async fn len(&self) -> usize {
        self.ids.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.ids.lock().await.is_empty()
    }
}
