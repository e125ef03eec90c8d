use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};
use crate::models::ChatTurn;

mod chat_history;
mod postgres;
mod sqlite;

pub use chat_history::ChatHistoryGateway;
pub use postgres::PostgresChatHistory;
pub use sqlite::SqliteChatHistory;

pub type ChatHistoryFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

/// A relational table of chat turns. Every call opens its own connection and
/// releases it before returning, whatever the outcome.
pub trait ChatHistoryStore: Send + Sync {
    fn backend(&self) -> StoreBackend;

    fn insert_turn<'a>(
        &'a self,
        user_input: &'a str,
        assistant_response: &'a str,
    ) -> ChatHistoryFuture<'a, ()>;

    /// Newest first. `None` returns every row.
    fn list_turns<'a>(&'a self, limit: Option<u32>) -> ChatHistoryFuture<'a, Vec<ChatTurn>>;
}

pub fn history_store_from_config(config: &StoreConfig) -> Arc<dyn ChatHistoryStore> {
    match config {
        StoreConfig::Postgres(postgres) => Arc::new(PostgresChatHistory::new(postgres)),
        StoreConfig::Sqlite(sqlite) => Arc::new(SqliteChatHistory::new(sqlite)),
    }
}
