use std::sync::Arc;

use thiserror::Error;

use super::gateway::{ChatMessage, LlmGateway, LlmGatewayError, LlmGatewayRequest};
use super::observability::{LlmCallSite, generate_with_telemetry};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct OrchestratorError(#[from] pub LlmGatewayError);

/// Produces the assistant reply for a message that already passed the topic gate.
#[derive(Clone)]
pub struct CompletionOrchestrator {
    llm_gateway: Arc<dyn LlmGateway>,
}

impl CompletionOrchestrator {
    pub fn new(llm_gateway: Arc<dyn LlmGateway>) -> Self {
        Self { llm_gateway }
    }

    pub async fn respond(&self, message: &str) -> Result<String, OrchestratorError> {
        let request = LlmGatewayRequest::new(vec![ChatMessage::user(message)]);
        let response = generate_with_telemetry(
            self.llm_gateway.as_ref(),
            LlmCallSite::CompletionOrchestrator,
            request,
        )
        .await?;
        Ok(response.content.trim().to_string())
    }
}
