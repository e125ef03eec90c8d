use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::gating::GatingResult;
use shared::models::{ChatRequest, ChatResponse};
use tracing::debug;

use super::errors::bad_request_response;
use super::{AppState, REJECTION_NOTICE};

pub(super) async fn submit_message(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Response {
    let message = req.message.trim();
    if message.is_empty() {
        return bad_request_response("invalid_message", "message must not be empty");
    }

    let result = state.pipeline.handle(message).await;
    debug!(outcome = result.as_str(), "chat message handled");

    match result {
        GatingResult::Accepted(reply) => {
            (StatusCode::OK, Json(ChatResponse::Accepted { reply })).into_response()
        }
        GatingResult::Rejected => (
            StatusCode::OK,
            Json(ChatResponse::Rejected {
                notice: REJECTION_NOTICE.to_string(),
            }),
        )
            .into_response(),
        GatingResult::Error(message) => (
            StatusCode::BAD_GATEWAY,
            Json(ChatResponse::Error {
                notice: format!("Something went wrong: {message}"),
            }),
        )
            .into_response(),
    }
}
