use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::{LlmGateway, LlmGatewayError, LlmGatewayRequest, LlmGatewayResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmCallSite {
    TopicClassifier,
    CompletionOrchestrator,
}

impl LlmCallSite {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopicClassifier => "topic_classifier",
            Self::CompletionOrchestrator => "completion_orchestrator",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmTelemetryEvent {
    pub call_site: &'static str,
    pub outcome: &'static str,
    pub latency_ms: u64,
    pub model: Option<String>,
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
    pub error_type: Option<&'static str>,
}

pub async fn generate_with_telemetry(
    llm_gateway: &dyn LlmGateway,
    call_site: LlmCallSite,
    request: LlmGatewayRequest,
) -> Result<LlmGatewayResponse, LlmGatewayError> {
    let started_at = Instant::now();
    let result = llm_gateway.generate(request).await;
    log_telemetry(&telemetry_for_result(call_site, started_at.elapsed(), &result));
    result
}

fn telemetry_for_result(
    call_site: LlmCallSite,
    latency: Duration,
    result: &Result<LlmGatewayResponse, LlmGatewayError>,
) -> LlmTelemetryEvent {
    let latency_ms = duration_to_millis(latency);
    match result {
        Ok(response) => {
            let usage = response.usage.as_ref();
            LlmTelemetryEvent {
                call_site: call_site.as_str(),
                outcome: "success",
                latency_ms,
                model: Some(response.model.clone()),
                prompt_tokens: usage.map(|usage| usage.prompt_tokens),
                completion_tokens: usage.map(|usage| usage.completion_tokens),
                total_tokens: usage.map(|usage| usage.total_tokens),
                error_type: None,
            }
        }
        Err(err) => LlmTelemetryEvent {
            call_site: call_site.as_str(),
            outcome: "failure",
            latency_ms,
            model: None,
            prompt_tokens: None,
            completion_tokens: None,
            total_tokens: None,
            error_type: Some(error_type(err)),
        },
    }
}

fn log_telemetry(event: &LlmTelemetryEvent) {
    if event.error_type.is_some() {
        warn!(
            call_site = event.call_site,
            outcome = event.outcome,
            latency_ms = event.latency_ms,
            error_type = event.error_type,
            "llm call finished"
        );
    } else {
        info!(
            call_site = event.call_site,
            outcome = event.outcome,
            latency_ms = event.latency_ms,
            model = event.model.as_deref(),
            prompt_tokens = event.prompt_tokens,
            completion_tokens = event.completion_tokens,
            total_tokens = event.total_tokens,
            "llm call finished"
        );
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn error_type(error: &LlmGatewayError) -> &'static str {
    match error {
        LlmGatewayError::Timeout => "timeout",
        LlmGatewayError::ProviderFailure(_) => "provider_failure",
        LlmGatewayError::InvalidProviderPayload(_) => "invalid_provider_payload",
    }
}
