use serde::{Deserialize, Serialize};

/// Body of a single agent call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentRequest {
    pub message: String,
    #[serde(rename = "agentId")]
    pub agent_id: String,
}

impl AgentRequest {
    /// Create a request for the given agent.
    pub fn new(message: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            agent_id: agent_id.into(),
        }
    }
}

/// Envelope returned by the agent endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentEnvelope {
    pub success: bool,
    #[serde(default)]
    pub response: Option<AgentResponse>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Inner response of a successful envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentResponse {
    pub status: String,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Result of one assessment call.
///
/// `Success` carries the unvalidated payload; shape checking belongs to
/// [`crate::report::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success { raw_result: serde_json::Value },
    Failure { reason: String },
}

impl Outcome {
    /// Build a failure outcome.
    pub fn failure(reason: impl Into<String>) -> Self {
        Outcome::Failure {
            reason: reason.into(),
        }
    }
}
