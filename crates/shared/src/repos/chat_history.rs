use std::sync::Arc;

use tracing::{debug, error};

use super::ChatHistoryStore;
use crate::models::ChatTurn;

/// Best-effort front for a [`ChatHistoryStore`]: store failures are logged here
/// and never reach the caller.
#[derive(Clone)]
pub struct ChatHistoryGateway {
    store: Arc<dyn ChatHistoryStore>,
}

impl ChatHistoryGateway {
    pub fn new(store: Arc<dyn ChatHistoryStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, user_input: &str, assistant_response: &str) {
        match self.store.insert_turn(user_input, assistant_response).await {
            Ok(()) => debug!(backend = self.store.backend().as_str(), "chat turn recorded"),
            Err(err) => error!(
                backend = self.store.backend().as_str(),
                error = %err,
                "failed to record chat turn"
            ),
        }
    }

    pub async fn fetch_recent(&self, limit: Option<u32>) -> Vec<ChatTurn> {
        match self.store.list_turns(limit).await {
            Ok(turns) => turns,
            Err(err) => {
                error!(
                    backend = self.store.backend().as_str(),
                    limit = ?limit,
                    error = %err,
                    "failed to load chat history"
                );
                Vec::new()
            }
        }
    }
}
