//! Storage layer for analysis history.
//!
//! History is kept as one JSON document under a single key of a
//! [`KeyValueStore`]. [`SqliteStorage`] is the durable backend and
//! [`MemoryStorage`] the in-process one used by tests.

mod history;
mod memory;
mod sqlite;

pub use history::{HistoryFilter, HistoryStore, HISTORY_CAPACITY, HISTORY_KEY};
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageResult;
use crate::report::{AnalysisReport, DeploymentReadiness, SeverityLevel};
use crate::session::SessionInput;

/// Whole-value key/value persistence.
///
/// Writes replace the full value for a key and are atomic: a failed `put`
/// leaves the previous value readable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the value stored under `key`.
    async fn put(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// A persisted, completed analysis session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Unique entry identifier.
    pub id: String,
    /// When the session completed.
    pub created_at: DateTime<Utc>,
    /// The submitted input.
    pub input: SessionInput,
    /// The validated report.
    pub report: AnalysisReport,
    /// Copy of the report's overall risk, for filtering.
    pub overall_risk: SeverityLevel,
    /// Copy of the report's deployment status.
    pub deployment_readiness: DeploymentReadiness,
}

impl HistoryEntry {
    /// Create an entry with a fresh id and the current time.
    pub fn new(input: SessionInput, report: AnalysisReport) -> Self {
        Self::with_timestamp(Uuid::new_v4().to_string(), Utc::now(), input, report)
    }

    /// Create an entry with an explicit id and timestamp.
    pub fn with_timestamp(
        id: impl Into<String>,
        created_at: DateTime<Utc>,
        input: SessionInput,
        report: AnalysisReport,
    ) -> Self {
        Self {
            id: id.into(),
            created_at,
            overall_risk: report.overall_risk_assessment.clone(),
            deployment_readiness: report.deployment_readiness.clone(),
            input,
            report,
        }
    }
}
