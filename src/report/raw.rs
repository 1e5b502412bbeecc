use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::{AnalysisReport, Dimension, DimensionFinding};

/// Borrowed view of an [`AnalysisReport`] in the agent's wire shape.
///
/// Field order is fixed by declaration order, so serialized output is
/// reproducible.
#[derive(Debug, Clone, Serialize)]
pub struct RawAnalysisReport<'a> {
    pub problem_understanding: &'a str,
    pub causality_assessment: RawFinding<'a>,
    pub common_sense_validation: RawFinding<'a>,
    pub generalization_risks: RawFinding<'a>,
    pub safety_review: RawFinding<'a>,
    pub cross_cutting_concerns: &'a [String],
    pub overall_risk_assessment: &'a str,
    pub deployment_readiness: &'a str,
    pub executive_summary: &'a str,
    pub recommended_improvements: &'a [String],
    pub required_guardrails: &'a [String],
    pub human_oversight_requirements: &'a [String],
}

impl<'a> RawAnalysisReport<'a> {
    /// Build the wire view of a report.
    pub fn new(report: &'a AnalysisReport) -> Self {
        Self {
            problem_understanding: &report.problem_understanding,
            causality_assessment: RawFinding::new(Dimension::Causality, &report.causality),
            common_sense_validation: RawFinding::new(Dimension::CommonSense, &report.common_sense),
            generalization_risks: RawFinding::new(
                Dimension::Generalization,
                &report.generalization,
            ),
            safety_review: RawFinding::new(Dimension::Safety, &report.safety),
            cross_cutting_concerns: &report.cross_cutting_concerns,
            overall_risk_assessment: report.overall_risk_assessment.as_str(),
            deployment_readiness: report.deployment_readiness.as_str(),
            executive_summary: &report.executive_summary,
            recommended_improvements: &report.recommended_improvements,
            required_guardrails: &report.required_guardrails,
            human_oversight_requirements: &report.human_oversight_requirements,
        }
    }
}

/// A finding serialized under its dimension-specific severity key.
#[derive(Debug, Clone)]
pub struct RawFinding<'a> {
    dimension: Dimension,
    finding: &'a DimensionFinding,
}

impl<'a> RawFinding<'a> {
    fn new(dimension: Dimension, finding: &'a DimensionFinding) -> Self {
        Self { dimension, finding }
    }
}

impl Serialize for RawFinding<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("summary", &self.finding.summary)?;
        map.serialize_entry(
            self.dimension.severity_key(),
            self.finding.severity_level.as_str(),
        )?;
        map.serialize_entry("critical_issues", &self.finding.critical_issues)?;
        map.end()
    }
}
