use serde_json::{Map, Value};

use super::{AnalysisReport, DeploymentReadiness, Dimension, DimensionFinding, SeverityLevel};
use crate::error::{ValidationError, ValidationResult};

/// Alternate severity keys accepted when a dimension omits its native one.
const SEVERITY_FALLBACK_KEYS: [&str; 4] = ["severity_level", "severity", "risk_level", "risk_severity"];

/// Validate a raw agent payload and normalize it into an [`AnalysisReport`].
///
/// A string payload is treated as embedded JSON (optionally fenced in a
/// markdown code block) and parsed before validation. Absent or `null`
/// fields are reported as [`ValidationError::MissingField`]; fields of the
/// wrong JSON type as [`ValidationError::WrongType`]. Paths are dotted,
/// e.g. `causality_assessment.critical_issues[2]`.
pub fn validate(raw: &Value) -> ValidationResult<AnalysisReport> {
    match raw {
        Value::String(text) => {
            let parsed = parse_embedded(text)?;
            validate_object(&parsed)
        }
        other => validate_object(other),
    }
}

fn validate_object(raw: &Value) -> ValidationResult<AnalysisReport> {
    let root = raw.as_object().ok_or_else(|| wrong_type("$", "object"))?;

    Ok(AnalysisReport {
        problem_understanding: string_field(root, "", "problem_understanding")?,
        causality: finding(root, Dimension::Causality)?,
        common_sense: finding(root, Dimension::CommonSense)?,
        generalization: finding(root, Dimension::Generalization)?,
        safety: finding(root, Dimension::Safety)?,
        cross_cutting_concerns: string_list(root, "", "cross_cutting_concerns")?,
        overall_risk_assessment: SeverityLevel::new(string_field(
            root,
            "",
            "overall_risk_assessment",
        )?),
        deployment_readiness: DeploymentReadiness::new(string_field(
            root,
            "",
            "deployment_readiness",
        )?),
        executive_summary: string_field(root, "", "executive_summary")?,
        recommended_improvements: string_list(root, "", "recommended_improvements")?,
        required_guardrails: string_list(root, "", "required_guardrails")?,
        human_oversight_requirements: string_list(root, "", "human_oversight_requirements")?,
    })
}

fn finding(root: &Map<String, Value>, dimension: Dimension) -> ValidationResult<DimensionFinding> {
    let key = dimension.key();
    let object = required(root, "", key)?
        .as_object()
        .ok_or_else(|| wrong_type(key, "object"))?;

    let severity_key = std::iter::once(dimension.severity_key())
        .chain(SEVERITY_FALLBACK_KEYS)
        .find(|k| object.get(*k).is_some_and(|v| !v.is_null()))
        .unwrap_or(dimension.severity_key());

    Ok(DimensionFinding {
        summary: string_field(object, key, "summary")?,
        severity_level: SeverityLevel::new(string_field(object, key, severity_key)?),
        critical_issues: string_list(object, key, "critical_issues")?,
    })
}

fn required<'a>(
    object: &'a Map<String, Value>,
    parent: &str,
    key: &str,
) -> ValidationResult<&'a Value> {
    match object.get(key) {
        Some(Value::Null) | None => Err(ValidationError::MissingField {
            field: path(parent, key),
        }),
        Some(value) => Ok(value),
    }
}

fn string_field(object: &Map<String, Value>, parent: &str, key: &str) -> ValidationResult<String> {
    required(object, parent, key)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| wrong_type(&path(parent, key), "string"))
}

fn string_list(
    object: &Map<String, Value>,
    parent: &str,
    key: &str,
) -> ValidationResult<Vec<String>> {
    let field = path(parent, key);
    let items = required(object, parent, key)?
        .as_array()
        .ok_or_else(|| wrong_type(&field, "array of strings"))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| wrong_type(&format!("{}[{}]", field, i), "string"))
        })
        .collect()
}

/// Parse a JSON document embedded in a string payload.
fn parse_embedded(text: &str) -> ValidationResult<Value> {
    let json = extract_json(text).ok_or_else(|| wrong_type("$", "object"))?;
    serde_json::from_str(json).map_err(|_| wrong_type("$", "object"))
}

/// Locate JSON text inside a completion: bare, ```json fenced, or ``` fenced.
fn extract_json(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Some(trimmed);
    }

    if text.contains("```json") {
        return text
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .map(str::trim)
            .filter(|s| !s.is_empty());
    }

    if text.contains("```") {
        return text
            .split("```")
            .nth(1)
            .map(str::trim)
            .filter(|s| !s.is_empty());
    }

    None
}

fn path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn wrong_type(field: &str, expected: &str) -> ValidationError {
    ValidationError::WrongType {
        field: field.to_string(),
        expected: expected.to_string(),
    }
}
