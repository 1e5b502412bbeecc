use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::types::{AgentEnvelope, AgentRequest, Outcome};
use super::AssessmentService;
use crate::config::{AgentConfig, RequestConfig, SecretString};
use crate::error::{AssessmentError, AssessmentResult};
use crate::prompts::build_analysis_message;
use crate::session::SessionInput;

/// Fallback reason when the agent reports failure without detail.
pub const GENERIC_FAILURE: &str = "Analysis failed. Please try again.";

/// HTTP client for the remote assessment agent.
///
/// Each call makes exactly one request; retrying is left to the caller.
#[derive(Clone)]
pub struct AssessmentClient {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
    request_config: RequestConfig,
}

impl AssessmentClient {
    /// Create a new assessment client
    pub fn new(config: &AgentConfig, request_config: RequestConfig) -> AssessmentResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(AssessmentError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            request_config,
        })
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request and unwrap the envelope down to the raw result.
    pub async fn call_agent(&self, request: &AgentRequest) -> AssessmentResult<serde_json::Value> {
        let api_key = self.api_key.as_ref().ok_or(AssessmentError::MissingApiKey)?;
        let url = format!("{}/api/agent", self.base_url);

        debug!(
            agent_id = %request.agent_id,
            message_len = request.message.len(),
            "Calling assessment agent"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key.expose()))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AssessmentError::Timeout {
                        timeout_ms: self.request_config.timeout_ms,
                    }
                } else {
                    AssessmentError::Http(e)
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(AssessmentError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let envelope: AgentEnvelope =
            response
                .json()
                .await
                .map_err(|e| AssessmentError::InvalidResponse {
                    message: format!("Failed to parse response: {}", e),
                })?;

        unwrap_envelope(envelope)
    }
}

/// Reduce an envelope to its result payload or a descriptive error.
fn unwrap_envelope(envelope: AgentEnvelope) -> AssessmentResult<serde_json::Value> {
    if !envelope.success {
        return Err(AssessmentError::Rejected {
            message: envelope
                .error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
        });
    }

    let response = envelope
        .response
        .ok_or_else(|| AssessmentError::InvalidResponse {
            message: "envelope has no response".to_string(),
        })?;

    if response.status != "success" {
        let message = match response.message {
            Some(detail) if !detail.trim().is_empty() => {
                format!("Agent returned status '{}': {}", response.status, detail)
            }
            _ => format!("Agent returned status '{}'", response.status),
        };
        return Err(AssessmentError::Rejected { message });
    }

    match response.result {
        Some(serde_json::Value::Null) | None => Err(AssessmentError::InvalidResponse {
            message: "response has no result".to_string(),
        }),
        Some(result) => Ok(result),
    }
}

#[async_trait]
impl AssessmentService for AssessmentClient {
    async fn request_assessment(&self, input: &SessionInput, agent_id: &str) -> Outcome {
        let request = AgentRequest::new(build_analysis_message(input), agent_id);
        let start = Instant::now();

        match self.call_agent(&request).await {
            Ok(raw_result) => {
                info!(
                    agent_id = %agent_id,
                    latency_ms = start.elapsed().as_millis(),
                    "Assessment call succeeded"
                );
                Outcome::Success { raw_result }
            }
            Err(e) => {
                error!(
                    agent_id = %agent_id,
                    error = %e,
                    latency_ms = start.elapsed().as_millis(),
                    "Assessment call failed"
                );
                Outcome::failure(e.to_string())
            }
        }
    }
}
