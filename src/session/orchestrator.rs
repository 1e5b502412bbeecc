use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::SessionInput;
use crate::assessment::{AssessmentService, Outcome};
use crate::error::SessionError;
use crate::export;
use crate::report::{validate, AnalysisReport};
use crate::storage::{HistoryEntry, HistoryStore, KeyValueStore};

/// Current state of the orchestrator's single session slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Idle,
    Running {
        input: SessionInput,
    },
    Succeeded {
        input: SessionInput,
        report: AnalysisReport,
        /// Id of the saved history entry; `None` if saving failed.
        entry_id: Option<String>,
    },
    Failed {
        input: SessionInput,
        reason: String,
    },
}

impl SessionState {
    /// Get the state name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Running { .. } => "running",
            SessionState::Succeeded { .. } => "succeeded",
            SessionState::Failed { .. } => "failed",
        }
    }

    /// Returns true while a remote call is in flight.
    pub fn is_running(&self) -> bool {
        matches!(self, SessionState::Running { .. })
    }

    /// The report of a succeeded session.
    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            SessionState::Succeeded { report, .. } => Some(report),
            _ => None,
        }
    }

    /// Echo of the submitted input, if any.
    pub fn input(&self) -> Option<&SessionInput> {
        match self {
            SessionState::Idle => None,
            SessionState::Running { input }
            | SessionState::Succeeded { input, .. }
            | SessionState::Failed { input, .. } => Some(input),
        }
    }
}

/// Drives one analysis session at a time and owns the history store.
///
/// Only a successful, validated session writes to history. A session whose
/// history write fails still succeeds; the failure is logged.
pub struct SessionOrchestrator<C, S> {
    client: C,
    agent_id: String,
    state: Mutex<SessionState>,
    history: RwLock<HistoryStore<S>>,
}

impl<C: AssessmentService, S: KeyValueStore> SessionOrchestrator<C, S> {
    /// Create an idle orchestrator
    pub fn new(client: C, history: HistoryStore<S>, agent_id: impl Into<String>) -> Self {
        Self {
            client,
            agent_id: agent_id.into(),
            state: Mutex::new(SessionState::Idle),
            history: RwLock::new(history),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.lock_state().clone()
    }

    /// The history store. Readers take `read()`; only this orchestrator and
    /// explicit user deletions write.
    pub fn history(&self) -> &RwLock<HistoryStore<S>> {
        &self.history
    }

    /// Run one session to completion.
    ///
    /// Blank context is rejected before any remote call and leaves the state
    /// untouched. A submit while another session is running returns
    /// [`SessionError::Busy`].
    pub async fn submit(&self, input: SessionInput) -> Result<AnalysisReport, SessionError> {
        input.validate()?;

        let guard = {
            let mut state = self.lock_state();
            if state.is_running() {
                warn!("Submit rejected, analysis already running");
                return Err(SessionError::Busy);
            }
            *state = SessionState::Running {
                input: input.clone(),
            };
            RunGuard::new(&self.state)
        };

        let start = Instant::now();
        debug!(task_type = %input.task_type, "Analysis session started");

        let result = match self
            .client
            .request_assessment(&input, &self.agent_id)
            .await
        {
            Outcome::Success { raw_result } => validate(&raw_result).map_err(SessionError::from),
            Outcome::Failure { reason } => Err(SessionError::RemoteFailure { reason }),
        };

        let latency_ms = start.elapsed().as_millis();

        match result {
            Ok(report) => {
                let entry = HistoryEntry::new(input.clone(), report.clone());
                let entry_id = entry.id.clone();

                let saved = match self.history.write().await.append(entry).await {
                    Ok(()) => Some(entry_id),
                    Err(e) => {
                        warn!(error = %e, "Failed to save analysis to history");
                        None
                    }
                };

                info!(
                    entry_id = ?saved,
                    overall_risk = %report.overall_risk_assessment,
                    latency_ms,
                    "Analysis session succeeded"
                );

                guard.finish(SessionState::Succeeded {
                    input,
                    report: report.clone(),
                    entry_id: saved,
                });
                Ok(report)
            }
            Err(err) => {
                warn!(error = %err, latency_ms, "Analysis session failed");

                guard.finish(SessionState::Failed {
                    input,
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Return to `Idle`, clearing the held report and input echo.
    pub fn reset(&self) -> Result<(), SessionError> {
        let mut state = self.lock_state();
        if state.is_running() {
            return Err(SessionError::Busy);
        }
        *state = SessionState::Idle;
        Ok(())
    }

    /// Export document for the current succeeded session, if there is one.
    pub fn export_current(
        &self,
        exported_at: DateTime<Utc>,
    ) -> Option<Result<Vec<u8>, serde_json::Error>> {
        match &*self.lock_state() {
            SessionState::Succeeded { input, report, .. } => {
                Some(export::encode(input, report, exported_at))
            }
            _ => None,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        lock(&self.state)
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    // State is replaced wholesale, so a poisoned value is still consistent.
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Returns the slot to `Idle` if a running session is dropped mid-flight.
struct RunGuard<'a> {
    state: &'a Mutex<SessionState>,
    finished: bool,
}

impl<'a> RunGuard<'a> {
    fn new(state: &'a Mutex<SessionState>) -> Self {
        Self {
            state,
            finished: false,
        }
    }

    fn finish(mut self, next: SessionState) {
        *lock(self.state) = next;
        self.finished = true;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *lock(self.state) = SessionState::Idle;
        }
    }
}
