//! Command-line adapter over the session orchestrator and history store.

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use crate::assessment::AssessmentService;
use crate::credentials::provision_api_key;
use crate::error::{CredentialError, SessionError};
use crate::export;
use crate::report::{AnalysisReport, Dimension};
use crate::session::{SessionInput, SessionOrchestrator, TaskType};
use crate::storage::{HistoryEntry, HistoryFilter, HistoryStore, KeyValueStore};

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Analyze a model prediction
    Analyze(AnalyzeArgs),

    /// Browse and manage past analyses
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },

    /// Store the agent API key in the runtime configuration file
    SetKey {
        /// API key, must start with "sk-"
        api_key: String,
    },
}

/// Arguments of the `analyze` command.
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Model output, scenario and prediction details
    #[arg(long)]
    pub context: String,

    /// Relevant variables, features or data points
    #[arg(long)]
    pub features: Option<String>,

    /// Classification, Regression, Ranking or "Decision Support"
    #[arg(long, default_value = "Classification")]
    pub task_type: String,

    /// Write a JSON export of the result into this directory
    #[arg(long)]
    pub export_dir: Option<PathBuf>,
}

/// History subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommands {
    /// List past analyses, newest first
    List {
        /// Filter by overall risk: low, medium, high
        #[arg(long)]
        risk: Option<String>,

        /// Filter by task type
        #[arg(long)]
        task_type: Option<String>,
    },

    /// Show the full report of one analysis
    Show { id: String },

    /// Delete one analysis
    Delete { id: String },

    /// Export one analysis as JSON
    Export {
        id: String,

        /// Directory to write the export into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

/// Result of CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    /// Exit code (0 = success, 1 = failure, 2 = invalid input)
    pub exit_code: i32,
    /// Output message
    pub message: String,
}

impl CliResult {
    /// Create a success result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Create an error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }

    /// Create an invalid-input result with the given message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            exit_code: 2,
            message: message.into(),
        }
    }
}

/// Execute the `analyze` command.
pub async fn execute_analyze<C, S>(
    orchestrator: &SessionOrchestrator<C, S>,
    args: AnalyzeArgs,
) -> CliResult
where
    C: AssessmentService,
    S: KeyValueStore,
{
    let task_type = match args.task_type.parse::<TaskType>() {
        Ok(t) => t,
        Err(e) => return CliResult::invalid(e),
    };

    let mut input = SessionInput::new(args.context, task_type);
    if let Some(features) = args.features {
        input = input.with_features(features);
    }

    let report = match orchestrator.submit(input).await {
        Ok(report) => report,
        Err(e @ SessionError::InvalidInput { .. }) => return CliResult::invalid(e.to_string()),
        Err(e) => return CliResult::error(e.to_string()),
    };

    let mut output = render_report(&report);

    if let Some(dir) = args.export_dir {
        let exported_at = Utc::now();
        match orchestrator.export_current(exported_at) {
            Some(Ok(bytes)) => match write_export(&dir, &bytes, exported_at) {
                Ok(path) => output.push_str(&format!("\nExported to {}\n", path.display())),
                Err(e) => return CliResult::error(format!("Export failed: {}", e)),
            },
            Some(Err(e)) => return CliResult::error(format!("Export failed: {}", e)),
            None => return CliResult::error("Export failed: no completed analysis"),
        }
    }

    CliResult::success(output)
}

/// Execute a history subcommand.
pub async fn execute_history<S: KeyValueStore>(
    command: HistoryCommands,
    history: &mut HistoryStore<S>,
) -> CliResult {
    match command {
        HistoryCommands::List { risk, task_type } => {
            let mut filter = HistoryFilter::new();
            if let Some(risk) = risk.filter(|r| !r.eq_ignore_ascii_case("all")) {
                filter = filter.with_risk(risk);
            }
            if let Some(task) = task_type.filter(|t| !t.eq_ignore_ascii_case("all")) {
                match task.parse::<TaskType>() {
                    Ok(t) => filter = filter.with_task_type(t),
                    Err(e) => return CliResult::invalid(e),
                }
            }
            execute_list(history, &filter)
        }
        HistoryCommands::Show { id } => match history.get(&id) {
            Some(entry) => CliResult::success(format!(
                "{}\n{}",
                render_entry_line(entry),
                render_report(&entry.report)
            )),
            None => CliResult::error(format!("No analysis with id {}", id)),
        },
        HistoryCommands::Delete { id } => {
            let existed = history.get(&id).is_some();
            match history.remove(&id).await {
                Ok(()) if existed => CliResult::success(format!("Deleted {}", id)),
                Ok(()) => CliResult::success(format!("No analysis with id {}, nothing deleted", id)),
                Err(e) => CliResult::error(format!("Failed to delete {}: {}", id, e)),
            }
        }
        HistoryCommands::Export { id, out_dir } => {
            let Some(entry) = history.get(&id) else {
                return CliResult::error(format!("No analysis with id {}", id));
            };
            let exported_at = Utc::now();
            let written = export::encode(&entry.input, &entry.report, exported_at)
                .map_err(|e| e.to_string())
                .and_then(|bytes| {
                    write_export(&out_dir, &bytes, exported_at).map_err(|e| e.to_string())
                });
            match written {
                Ok(path) => CliResult::success(format!("Exported to {}", path.display())),
                Err(e) => CliResult::error(format!("Export failed: {}", e)),
            }
        }
    }
}

fn execute_list<S: KeyValueStore>(history: &HistoryStore<S>, filter: &HistoryFilter) -> CliResult {
    let entries = history.list_filtered(filter);
    if entries.is_empty() {
        return CliResult::success("No analyses found");
    }

    let mut output = format!("{} of {} analyses\n", entries.len(), history.len());
    for entry in entries {
        output.push_str(&render_entry_line(entry));
        output.push('\n');
    }
    CliResult::success(output)
}

/// Execute the `set-key` command.
pub fn execute_set_key(api_key: &str, env_path: &Path) -> CliResult {
    match provision_api_key(api_key, env_path) {
        Ok(()) => CliResult::success(
            "API key updated successfully. Restart to use the new key.",
        ),
        Err(e @ CredentialError::InvalidFormat) => CliResult::invalid(e.to_string()),
        Err(e) => CliResult::error(e.to_string()),
    }
}

/// Write export bytes under `dir`, returning the file path.
pub fn write_export(dir: &Path, bytes: &[u8], exported_at: DateTime<Utc>) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export::file_name(exported_at));
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// One-line summary of a history entry.
pub fn render_entry_line(entry: &HistoryEntry) -> String {
    let context: String = entry.input.prediction_context.chars().take(60).collect();
    format!(
        "{}  {}  {:<16}  {:<8}  {}",
        entry.id,
        entry.created_at.format("%Y-%m-%d %H:%M"),
        entry.input.task_type.label(),
        entry.overall_risk.class().as_str(),
        context
    )
}

/// Plain-text rendering of a full report.
pub fn render_report(report: &AnalysisReport) -> String {
    let mut output = String::new();

    output.push_str("\nProblem Understanding\n");
    output.push_str(&format!("  {}\n", report.problem_understanding));

    for dimension in Dimension::ALL {
        let finding = report.finding(dimension);
        output.push_str(&format!(
            "\n{} [{} risk]\n  {}\n",
            dimension.title(),
            finding.severity_level,
            finding.summary
        ));
        push_list(&mut output, "Critical Issues", &finding.critical_issues);
    }

    push_list(&mut output, "Cross-Cutting Concerns", &report.cross_cutting_concerns);

    output.push_str("\nExecutive Summary\n");
    output.push_str(&format!("  {}\n", report.executive_summary));
    output.push_str(&format!(
        "  Overall risk: {} ({})\n",
        report.overall_risk_assessment,
        report.overall_risk_assessment.class()
    ));
    output.push_str(&format!(
        "  Deployment: {} [{}]\n",
        report.deployment_readiness,
        if report.deployment_readiness.is_ready() {
            "ready"
        } else {
            "not ready"
        }
    ));

    push_list(&mut output, "Recommended Improvements", &report.recommended_improvements);
    push_list(&mut output, "Required Guardrails", &report.required_guardrails);
    push_list(
        &mut output,
        "Human Oversight Requirements",
        &report.human_oversight_requirements,
    );

    output
}

fn push_list(output: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    output.push_str(&format!("  {}:\n", title));
    for item in items {
        output.push_str(&format!("    - {}\n", item));
    }
}
