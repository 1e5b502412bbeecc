//! Shared fixtures for unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};

use crate::report::AnalysisReport;
use crate::session::{SessionInput, TaskType};
use crate::storage::HistoryEntry;

/// A fully populated payload as the agent returns it.
pub fn sample_raw_report() -> Value {
    json!({
        "problem_understanding": "The model predicts whether a borrower defaults within 12 months.",
        "causality_assessment": {
            "summary": "Income is treated as causal although it proxies employment stability.",
            "risk_level": "Medium",
            "critical_issues": ["Proxy variable for employment", "No counterfactual check"]
        },
        "common_sense_validation": {
            "summary": "Predictions are broadly plausible.",
            "severity": "low",
            "critical_issues": []
        },
        "generalization_risks": {
            "summary": "Training data covers a single region.",
            "risk_severity": "high",
            "critical_issues": ["Regional sampling bias"]
        },
        "safety_review": {
            "summary": "Denials affect protected groups disproportionately.",
            "risk_level": "high",
            "critical_issues": ["Disparate impact on age"]
        },
        "cross_cutting_concerns": ["Data drift"],
        "overall_risk_assessment": "high",
        "deployment_readiness": "Not ready for production",
        "executive_summary": "High risk; fix sampling and fairness before deployment.",
        "recommended_improvements": ["Collect multi-region data", "Add fairness constraints"],
        "required_guardrails": ["Human review of denials"],
        "human_oversight_requirements": ["Monthly fairness audit"]
    })
}

/// The validated form of [`sample_raw_report`].
pub fn sample_report() -> AnalysisReport {
    crate::report::validate(&sample_raw_report()).expect("fixture must validate")
}

/// Sample report with a different overall risk.
pub fn report_with_risk(risk: &str) -> AnalysisReport {
    let mut raw = sample_raw_report();
    raw["overall_risk_assessment"] = json!(risk);
    crate::report::validate(&raw).expect("fixture must validate")
}

/// A minimal valid input.
pub fn sample_input(task_type: TaskType) -> SessionInput {
    SessionInput::new("Model predicts loan default", task_type)
}

/// Fixed base timestamp for ordering tests.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

/// Entry created `offset_secs` after [`base_time`].
pub fn entry_at(id: &str, offset_secs: i64, risk: &str, task_type: TaskType) -> HistoryEntry {
    HistoryEntry::with_timestamp(
        id,
        base_time() + Duration::seconds(offset_secs),
        sample_input(task_type),
        report_with_risk(risk),
    )
}
