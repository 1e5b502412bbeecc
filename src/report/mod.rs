//! Canonical analysis report shape.
//!
//! The remote agent returns a loosely shaped JSON object. [`validate`] turns
//! that payload into an [`AnalysisReport`], and [`AnalysisReport::to_raw`]
//! emits the same wire shape back (used for exports).
//!
//! Severity and deployment status are open vocabularies: unrecognized values
//! are kept verbatim and classified as [`RiskClass::Unknown`] instead of being
//! rejected.

mod raw;
mod validator;


pub use raw::RawAnalysisReport;
pub use validator::validate;

use serde::{Deserialize, Serialize};

/// Qualitative risk rank, stored as the (trimmed) string the agent produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeverityLevel(String);

impl SeverityLevel {
    /// Create a severity level, trimming surrounding whitespace.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self(value.trim().to_string())
    }

    /// The stored value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Map to one of the known risk classes, case-insensitively.
    pub fn class(&self) -> RiskClass {
        match self.0.to_lowercase().as_str() {
            "low" => RiskClass::Low,
            "medium" => RiskClass::Medium,
            "high" => RiskClass::High,
            _ => RiskClass::Unknown,
        }
    }

    /// Case-insensitive equality against a filter value.
    pub fn matches(&self, level: &str) -> bool {
        self.0.eq_ignore_ascii_case(level.trim())
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SeverityLevel {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Known severity classes; anything else is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskClass {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskClass {
    /// Get the class name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskClass::Low => "low",
            RiskClass::Medium => "medium",
            RiskClass::High => "high",
            RiskClass::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RiskClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Free-text deployment status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentReadiness(String);

impl DeploymentReadiness {
    /// Create a status, trimming surrounding whitespace.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self(value.trim().to_string())
    }

    /// The stored value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the status mentions "ready" in any casing.
    ///
    /// This is a substring test, so "Not Ready" also counts as ready.
    pub fn is_ready(&self) -> bool {
        self.0.to_lowercase().contains("ready")
    }
}

impl std::fmt::Display for DeploymentReadiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeploymentReadiness {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The four assessed dimensions, with their wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Causality,
    CommonSense,
    Generalization,
    Safety,
}

impl Dimension {
    /// All dimensions in report order.
    pub const ALL: [Dimension; 4] = [
        Dimension::Causality,
        Dimension::CommonSense,
        Dimension::Generalization,
        Dimension::Safety,
    ];

    /// Top-level key of this dimension in the raw payload.
    pub fn key(&self) -> &'static str {
        match self {
            Dimension::Causality => "causality_assessment",
            Dimension::CommonSense => "common_sense_validation",
            Dimension::Generalization => "generalization_risks",
            Dimension::Safety => "safety_review",
        }
    }

    /// Key the agent uses for this dimension's severity.
    pub fn severity_key(&self) -> &'static str {
        match self {
            Dimension::Causality => "risk_level",
            Dimension::CommonSense => "severity",
            Dimension::Generalization => "risk_severity",
            Dimension::Safety => "risk_level",
        }
    }

    /// Human-readable section title.
    pub fn title(&self) -> &'static str {
        match self {
            Dimension::Causality => "Causality Assessment",
            Dimension::CommonSense => "Common-Sense Validation",
            Dimension::Generalization => "Generalization Risks",
            Dimension::Safety => "Safety Review",
        }
    }
}

/// Assessment of a single dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionFinding {
    pub summary: String,
    pub severity_level: SeverityLevel,
    pub critical_issues: Vec<String>,
}

/// Validated, immutable analysis report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub problem_understanding: String,
    pub causality: DimensionFinding,
    pub common_sense: DimensionFinding,
    pub generalization: DimensionFinding,
    pub safety: DimensionFinding,
    pub cross_cutting_concerns: Vec<String>,
    pub overall_risk_assessment: SeverityLevel,
    pub deployment_readiness: DeploymentReadiness,
    pub executive_summary: String,
    pub recommended_improvements: Vec<String>,
    pub required_guardrails: Vec<String>,
    pub human_oversight_requirements: Vec<String>,
}

impl AnalysisReport {
    /// Finding for one dimension.
    pub fn finding(&self, dimension: Dimension) -> &DimensionFinding {
        match dimension {
            Dimension::Causality => &self.causality,
            Dimension::CommonSense => &self.common_sense,
            Dimension::Generalization => &self.generalization,
            Dimension::Safety => &self.safety,
        }
    }

    /// Borrowed view in the agent's wire shape.
    pub fn raw(&self) -> RawAnalysisReport<'_> {
        RawAnalysisReport::new(self)
    }

    /// Re-emit the report in the agent's wire shape.
    ///
    /// `validate(&report.to_raw())` yields the same report back.
    pub fn to_raw(&self) -> serde_json::Value {
        // RawAnalysisReport only holds strings and string lists.
        serde_json::to_value(self.raw()).unwrap_or(serde_json::Value::Null)
    }
}
