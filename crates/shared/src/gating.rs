use std::sync::Arc;

use tracing::{info, warn};

use crate::llm::{CompletionOrchestrator, LlmGateway, TopicClassifier};
use crate::repos::{ChatHistoryGateway, ChatHistoryStore};

/// What the presentation layer gets back for one submitted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatingResult {
    Rejected,
    Accepted(String),
    Error(String),
}

impl GatingResult {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rejected => "rejected",
            Self::Accepted(_) => "accepted",
            Self::Error(_) => "error",
        }
    }
}

/// Topic gate, completion call and best-effort history write for one message.
#[derive(Clone)]
pub struct GatingPipeline {
    classifier: TopicClassifier,
    orchestrator: CompletionOrchestrator,
    history: ChatHistoryGateway,
}

impl GatingPipeline {
    pub fn new(
        classifier: TopicClassifier,
        orchestrator: CompletionOrchestrator,
        history: ChatHistoryGateway,
    ) -> Self {
        Self {
            classifier,
            orchestrator,
            history,
        }
    }

    /// Classifier and orchestrator share one completion provider.
    pub fn from_parts(
        llm_gateway: Arc<dyn LlmGateway>,
        history_store: Arc<dyn ChatHistoryStore>,
    ) -> Self {
        Self::new(
            TopicClassifier::new(llm_gateway.clone()),
            CompletionOrchestrator::new(llm_gateway),
            ChatHistoryGateway::new(history_store),
        )
    }

    pub fn history(&self) -> &ChatHistoryGateway {
        &self.history
    }

    pub async fn handle(&self, user_message: &str) -> GatingResult {
        if !self.classifier.classify(user_message).await {
            info!(outcome = "rejected", "message is off topic");
            return GatingResult::Rejected;
        }

        let reply = match self.orchestrator.respond(user_message).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(outcome = "error", error = %err, "completion request failed");
                return GatingResult::Error(err.to_string());
            }
        };

        // A failed write still returns the reply; the turn is simply not kept.
        self.history.record(user_message, &reply).await;
        info!(outcome = "accepted", reply_chars = reply.chars().count(), "message answered");
        GatingResult::Accepted(reply)
    }
}
