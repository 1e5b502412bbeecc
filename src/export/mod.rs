//! Self-contained JSON export of a session's input and report.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::report::{AnalysisReport, RawAnalysisReport};
use crate::session::SessionInput;

/// Exported document. Field order is fixed by declaration order.
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub timestamp: String,
    pub input: &'a SessionInput,
    pub analysis: RawAnalysisReport<'a>,
}

impl<'a> ExportDocument<'a> {
    /// Assemble a document for `input` and `report`.
    pub fn new(input: &'a SessionInput, report: &'a AnalysisReport, exported_at: DateTime<Utc>) -> Self {
        Self {
            timestamp: format_timestamp(exported_at),
            input,
            analysis: report.raw(),
        }
    }
}

/// Encode an export document as pretty-printed JSON bytes.
pub fn encode(
    input: &SessionInput,
    report: &AnalysisReport,
    exported_at: DateTime<Utc>,
) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(&ExportDocument::new(input, report, exported_at))
}

/// Download file name for an export taken at `exported_at`.
pub fn file_name(exported_at: DateTime<Utc>) -> String {
    format!("bishforge-analysis-{}.json", exported_at.timestamp_millis())
}

/// ISO-8601 UTC with millisecond precision, e.g. `2025-01-01T00:00:00.000Z`.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
