//! Analysis sessions: user input and the orchestrator state machine.
//!
//! ```text
//! Idle ──submit──▶ Running ──Success + valid report──▶ Succeeded
//!   ▲                 └──────Failure / invalid report──▶ Failed
//!   └──────────────── reset ◀──────────────────────────────┘
//! ```

mod input;
mod orchestrator;

pub use input::{SessionInput, TaskType};
pub use orchestrator::{SessionOrchestrator, SessionState};
