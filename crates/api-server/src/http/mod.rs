use axum::Router;
use axum::routing::{get, post};
use shared::gating::GatingPipeline;

mod chat;
mod errors;
mod health;
mod history;


pub(crate) const REJECTION_NOTICE: &str = "Please ask pet-related questions only.";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: GatingPipeline,
    pub history_default_limit: u32,
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/v1/chat", post(chat::submit_message))
        .route("/v1/history", get(history::list_history))
        .with_state(app_state)
}
