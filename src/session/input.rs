use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Kind of prediction task the model performs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    #[default]
    Classification,
    Regression,
    Ranking,
    #[serde(rename = "Decision Support")]
    DecisionSupport,
}

impl TaskType {
    /// All task types in display order.
    pub const ALL: [TaskType; 4] = [
        TaskType::Classification,
        TaskType::Regression,
        TaskType::Ranking,
        TaskType::DecisionSupport,
    ];

    /// Human-readable label, also used on the wire.
    pub fn label(&self) -> &'static str {
        match self {
            TaskType::Classification => "Classification",
            TaskType::Regression => "Regression",
            TaskType::Ranking => "Ranking",
            TaskType::DecisionSupport => "Decision Support",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "classification" => Ok(TaskType::Classification),
            "regression" => Ok(TaskType::Regression),
            "ranking" => Ok(TaskType::Ranking),
            "decision support" => Ok(TaskType::DecisionSupport),
            _ => Err(format!("Unknown task type: {}", s)),
        }
    }
}

/// One user submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInput {
    /// Description of the model output and scenario. Required.
    pub prediction_context: String,
    /// Relevant variables or data points. Empty when not provided.
    #[serde(default)]
    pub input_features: String,
    pub task_type: TaskType,
}

impl SessionInput {
    /// Create an input with no feature list.
    pub fn new(prediction_context: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            prediction_context: prediction_context.into(),
            input_features: String::new(),
            task_type,
        }
    }

    /// Attach the input feature description.
    pub fn with_features(mut self, input_features: impl Into<String>) -> Self {
        self.input_features = input_features.into();
        self
    }

    /// Feature text, if any non-whitespace was given.
    pub fn features(&self) -> Option<&str> {
        let trimmed = self.input_features.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Check the required fields before any remote call is made.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.prediction_context.trim().is_empty() {
            return Err(SessionError::InvalidInput {
                field: "prediction_context".to_string(),
                reason: "Please provide prediction context".to_string(),
            });
        }
        Ok(())
    }
}
