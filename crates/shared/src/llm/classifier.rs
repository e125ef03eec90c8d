use std::sync::Arc;

use tracing::{debug, warn};

use super::gateway::{ChatMessage, LlmGateway, LlmGatewayError, LlmGatewayRequest};
use super::observability::{LlmCallSite, generate_with_telemetry};
use super::prompts::{CLASSIFIER_ADMIT_TOKEN, CLASSIFIER_TEMPERATURE, PET_TOPIC_CLASSIFIER_PROMPT};

/// Result of asking the provider whether a message is on topic.
#[derive(Debug)]
pub enum ClassificationOutcome {
    Admitted,
    Rejected,
    /// The provider could not be asked. Callers treat this as admitted.
    TransportFailed(LlmGatewayError),
}

impl ClassificationOutcome {
    pub fn is_admitted(&self) -> bool {
        match self {
            Self::Admitted | Self::TransportFailed(_) => true,
            Self::Rejected => false,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admitted => "admitted",
            Self::Rejected => "rejected",
            Self::TransportFailed(_) => "transport_failed",
        }
    }
}

#[derive(Clone)]
pub struct TopicClassifier {
    llm_gateway: Arc<dyn LlmGateway>,
}

impl TopicClassifier {
    pub fn new(llm_gateway: Arc<dyn LlmGateway>) -> Self {
        Self { llm_gateway }
    }

    pub async fn classify_outcome(&self, message: &str) -> ClassificationOutcome {
        let request = LlmGatewayRequest::new(vec![
            ChatMessage::system(PET_TOPIC_CLASSIFIER_PROMPT),
            ChatMessage::user(message),
        ])
        .with_temperature(CLASSIFIER_TEMPERATURE);

        match generate_with_telemetry(
            self.llm_gateway.as_ref(),
            LlmCallSite::TopicClassifier,
            request,
        )
        .await
        {
            Ok(response) => {
                debug!(reply = %response.content, "topic classifier replied");
                verdict_from_reply(&response.content)
            }
            Err(err) => ClassificationOutcome::TransportFailed(err),
        }
    }

    /// Fail-open topic check: provider failures admit the message.
    pub async fn classify(&self, message: &str) -> bool {
        let outcome = self.classify_outcome(message).await;
        if let ClassificationOutcome::TransportFailed(err) = &outcome {
            warn!(error = %err, "topic classifier unavailable; admitting message");
        }
        outcome.is_admitted()
    }
}

fn verdict_from_reply(reply: &str) -> ClassificationOutcome {
    if reply.trim().to_lowercase() == CLASSIFIER_ADMIT_TOKEN {
        ClassificationOutcome::Admitted
    } else {
        ClassificationOutcome::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::{ClassificationOutcome, verdict_from_reply};
    use crate::llm::LlmGatewayError;

    #[test]
    fn verdict_accepts_yes_with_whitespace_and_case() {
        for reply in ["yes", "Yes", "  YES\n", "\tyEs "] {
            assert!(
                matches!(verdict_from_reply(reply), ClassificationOutcome::Admitted),
                "expected {reply:?} to admit"
            );
        }
    }

    #[test]
    fn verdict_rejects_anything_but_exact_yes() {
        for reply in ["no", "yes.", "Yes, it is about pets", "y", "", "sure"] {
            assert!(
                matches!(verdict_from_reply(reply), ClassificationOutcome::Rejected),
                "expected {reply:?} to reject"
            );
        }
    }

    #[test]
    fn transport_failure_counts_as_admitted() {
        let outcome = ClassificationOutcome::TransportFailed(LlmGatewayError::Timeout);
        assert!(outcome.is_admitted());
        assert_eq!(outcome.as_str(), "transport_failed");
        assert!(!ClassificationOutcome::Rejected.is_admitted());
    }
}
