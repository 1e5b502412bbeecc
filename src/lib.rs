//! # BishForge
//!
//! Session and history manager for ML prediction analyses. A prediction
//! context is sent to a remote reasoning agent, which returns a structured
//! report covering causality, common-sense validity, generalization and
//! safety. Reports are validated, kept in a bounded local history and can
//! be exported as JSON.
//!
//! ## Architecture
//!
//! ```text
//! CLI → SessionOrchestrator → AssessmentClient (HTTP) → agent
//!              ↓
//!        report::validate
//!              ↓
//!        HistoryStore → KeyValueStore (SQLite / memory)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use bishforge::assessment::AssessmentClient;
//! use bishforge::session::{SessionInput, SessionOrchestrator, TaskType};
//! use bishforge::storage::{HistoryStore, SqliteStorage};
//! use bishforge::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let storage = SqliteStorage::new(&config.database).await?;
//!     let history = HistoryStore::open(storage).await;
//!     let client = AssessmentClient::new(&config.agent, config.request.clone())?;
//!     let orchestrator = SessionOrchestrator::new(client, history, &config.agent.agent_id);
//!
//!     let input = SessionInput::new("Model predicts loan default", TaskType::Classification);
//!     let report = orchestrator.submit(input).await?;
//!     println!("{}", report.executive_summary);
//!     Ok(())
//! }
//! ```

/// Remote assessment agent client.
pub mod assessment;
/// Command-line adapter.
pub mod cli;
/// Configuration management.
pub mod config;
/// API key provisioning.
pub mod credentials;
/// Error types and result aliases for the application.
pub mod error;
/// JSON export of completed analyses.
pub mod export;
/// Instruction text sent to the agent.
pub mod prompts;
/// Analysis report model and validation.
pub mod report;
/// Session input and orchestration.
pub mod session;
/// Key-value persistence and the analysis history.
pub mod storage;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use report::AnalysisReport;
pub use session::{SessionInput, SessionOrchestrator, TaskType};
