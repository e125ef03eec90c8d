pub mod classifier;
pub mod gateway;
pub mod observability;
pub mod openai;
pub mod prompts;
pub mod responder;

pub use classifier::{ClassificationOutcome, TopicClassifier};
pub use gateway::{
    ChatMessage, ChatRole, LlmGateway, LlmGatewayError, LlmGatewayFuture, LlmGatewayRequest,
    LlmGatewayResponse, LlmTokenUsage,
};
pub use observability::{LlmCallSite, generate_with_telemetry};
pub use openai::{OpenAiGateway, OpenAiGatewayConfig};
pub use responder::{CompletionOrchestrator, OrchestratorError};
