use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use shared::models::{HistoryEntry, ListHistoryResponse};

use super::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct HistoryQuery {
    limit: Option<u32>,
}

pub(super) async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let limit = query.limit.unwrap_or(state.history_default_limit);
    let items = state
        .pipeline
        .history()
        .fetch_recent(Some(limit))
        .await
        .into_iter()
        .map(HistoryEntry::from)
        .collect();

    (StatusCode::OK, Json(ListHistoryResponse { items })).into_response()
}
