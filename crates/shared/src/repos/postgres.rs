use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgRow};
use sqlx::{Connection, PgConnection, Row};
use tracing::debug;

use super::{ChatHistoryFuture, ChatHistoryStore, StoreError};
use crate::config::{PostgresStoreConfig, StoreBackend};
use crate::models::ChatTurn;

const INSERT_TURN_SQL: &str =
    "INSERT INTO ChatHistory (UserInput, AssistantResponse) VALUES ($1, $2)";
// LIMIT NULL is LIMIT ALL in postgres.
const LIST_TURNS_SQL: &str = "SELECT UserInput, AssistantResponse, Timestamp
     FROM ChatHistory
     ORDER BY Timestamp DESC
     LIMIT $1";

#[derive(Debug, Clone)]
pub struct PostgresChatHistory {
    options: PgConnectOptions,
}

impl PostgresChatHistory {
    pub fn new(config: &PostgresStoreConfig) -> Self {
        Self::from_connect_options(
            PgConnectOptions::new()
                .host(&config.host)
                .port(config.port)
                .database(&config.database)
                .username(&config.user)
                .password(&config.password),
        )
    }

    pub fn from_connect_options(options: PgConnectOptions) -> Self {
        Self { options }
    }

    async fn open(&self) -> Result<PgConnection, StoreError> {
        Ok(PgConnection::connect_with(&self.options).await?)
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

impl ChatHistoryStore for PostgresChatHistory {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Postgres
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
    conn: &mut PgConnection,
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
    conn: &mut PgConnection,
    limit: Option<u32>,
) -> Result<Vec<ChatTurn>, StoreError> {
    let rows = sqlx::query(LIST_TURNS_SQL)
        .bind(limit.map(i64::from))
        .fetch_all(&mut *conn)
        .await?;

    rows.iter().map(row_to_turn).collect()
}

fn row_to_turn(row: &PgRow) -> Result<ChatTurn, StoreError> {
    let timestamp: DateTime<Utc> = row.try_get(2)?;
    Ok(ChatTurn {
        user_input: row.try_get(0)?,
        assistant_response: row.try_get(1)?,
        timestamp,
    })
}

async fn release(conn: PgConnection) {
    if let Err(err) = conn.close().await {
        debug!(error = %err, "postgres connection did not close cleanly");
    }
}
