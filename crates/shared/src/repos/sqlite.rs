use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Connection, Row, SqliteConnection};
use tracing::debug;

use super::{ChatHistoryFuture, ChatHistoryStore, StoreError};
use crate::config::{SqliteStoreConfig, StoreBackend};
use crate::models::ChatTurn;

const INSERT_TURN_SQL: &str =
    "INSERT INTO ChatHistory (UserInput, AssistantResponse) VALUES (?, ?)";
// Negative LIMIT means no limit. rowid breaks ties between turns stamped in
// the same millisecond.
const LIST_TURNS_SQL: &str = "SELECT UserInput, AssistantResponse, Timestamp
     FROM ChatHistory
     ORDER BY Timestamp DESC, rowid DESC
     LIMIT ?";
const UNBOUNDED_LIMIT: i64 = -1;

#[derive(Debug, Clone)]
pub struct SqliteChatHistory {
    options: SqliteConnectOptions,
}

impl SqliteChatHistory {
    pub fn new(config: &SqliteStoreConfig) -> Self {
        Self::from_connect_options(SqliteConnectOptions::new().filename(&config.path))
    }

    pub fn from_connect_options(options: SqliteConnectOptions) -> Self {
        Self { options }
    }

    async fn open(&self) -> Result<SqliteConnection, StoreError> {
        Ok(SqliteConnection::connect_with(&self.options).await?)
    }

    async fn insert(&self, user_input: &str, assistant_response: &str) -> Result<(), StoreError> {
        let mut conn = self.open().await?;
        let result = insert_turn(&mut conn, user_input, assistant_response).await;
        release(conn).await;
        result
    }

    async fn list(&self, limit: Option<u32>) -> Result<Vec<ChatTurn>, StoreError> {
        let mut conn = self.open().await?;
        let result = list_turns(&mut conn, limit).await;
        release(conn).await;
        result
    }
}

impl ChatHistoryStore for SqliteChatHistory {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Sqlite
    }

    fn insert_turn<'a>(
        &'a self,
        user_input: &'a str,
        assistant_response: &'a str,
    ) -> ChatHistoryFuture<'a, ()> {
        Box::pin(self.insert(user_input, assistant_response))
    }

    fn list_turns<'a>(&'a self, limit: Option<u32>) -> ChatHistoryFuture<'a, Vec<ChatTurn>> {
        Box::pin(self.list(limit))
    }
}

async fn insert_turn(
    conn: &mut SqliteConnection,
    user_input: &str,
    assistant_response: &str,
) -> Result<(), StoreError> {
    let mut tx = conn.begin().await?;
    sqlx::query(INSERT_TURN_SQL)
        .bind(user_input)
        .bind(assistant_response)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

async fn list_turns(
    conn: &mut SqliteConnection,
    limit: Option<u32>,
) -> Result<Vec<ChatTurn>, StoreError> {
    let rows = sqlx::query(LIST_TURNS_SQL)
        .bind(limit.map_or(UNBOUNDED_LIMIT, i64::from))
        .fetch_all(&mut *conn)
        .await?;

    rows.iter().map(row_to_turn).collect()
}

fn row_to_turn(row: &SqliteRow) -> Result<ChatTurn, StoreError> {
    // SQLite keeps the timestamp as UTC text without an offset.
    let timestamp: NaiveDateTime = row.try_get(2)?;
    Ok(ChatTurn {
        user_input: row.try_get(0)?,
        assistant_response: row.try_get(1)?,
        timestamp: timestamp.and_utc(),
    })
}

async fn release(conn: SqliteConnection) {
    if let Err(err) = conn.close().await {
        debug!(error = %err, "sqlite connection did not close cleanly");
    }
}
