use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const HISTORY_DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One persisted user/assistant exchange. The timestamp is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub user_input: String,
    pub assistant_response: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    pub fn display_timestamp(&self) -> String {
        self.timestamp
            .format(HISTORY_DISPLAY_TIMESTAMP_FORMAT)
            .to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ChatResponse {
    Accepted { reply: String },
    Rejected { notice: String },
    Error { notice: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub user_input: String,
    pub assistant_response: String,
    pub timestamp: DateTime<Utc>,
    pub display_timestamp: String,
}

impl From<ChatTurn> for HistoryEntry {
    fn from(turn: ChatTurn) -> Self {
        let display_timestamp = turn.display_timestamp();
        Self {
            user_input: turn.user_input,
            assistant_response: turn.assistant_response,
            timestamp: turn.timestamp,
            display_timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListHistoryResponse {
    pub items: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}
