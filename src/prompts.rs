//! Instruction text sent to the assessment agent.
//!
//! Sections always appear in the same order (context, features, task type)
//! so identical inputs produce byte-identical instructions.

use crate::session::SessionInput;

/// Opening line of every instruction.
pub const ANALYSIS_PREAMBLE: &str = "Analyze this AI prediction:";

/// Closing request describing the expected report.
pub const ANALYSIS_REQUEST: &str = "Please provide a comprehensive validation report assessing causality, common-sense plausibility, generalization risks, and safety concerns.";

/// Build the natural-language instruction for one session.
pub fn build_analysis_message(input: &SessionInput) -> String {
    let mut message = format!(
        "{}\n\nPrediction Context:\n{}\n\n",
        ANALYSIS_PREAMBLE,
        input.prediction_context.trim()
    );

    if let Some(features) = input.features() {
        message.push_str(&format!("Input Features:\n{}\n\n", features));
    }

    message.push_str(&format!(
        "Task Type: {}\n\n{}",
        input.task_type.label(),
        ANALYSIS_REQUEST
    ));

    message
}
