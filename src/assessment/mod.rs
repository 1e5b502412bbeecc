//! Remote assessment agent client.
//!
//! [`AssessmentService`] is the seam the session orchestrator calls through;
//! [`AssessmentClient`] is the HTTP implementation.

mod client;
mod types;

pub use client::{AssessmentClient, GENERIC_FAILURE};
pub use types::{AgentEnvelope, AgentRequest, AgentResponse, Outcome};

use async_trait::async_trait;

use crate::session::SessionInput;

/// Issues one assessment request per call and never retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssessmentService: Send + Sync {
    /// Request an assessment of `input` from the agent identified by `agent_id`.
    async fn request_assessment(&self, input: &SessionInput, agent_id: &str) -> Outcome;
}
