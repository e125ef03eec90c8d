use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::{ErrorBody, ErrorResponse};

pub(super) fn bad_request_response(code: &str, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            },
        }),
    )
        .into_response()
}
