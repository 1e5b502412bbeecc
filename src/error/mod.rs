use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Assessment error: {0}")]
    Assessment(#[from] AssessmentError),
}

/// Storage layer errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("Serialization failed: {message}")]
    Serialization { message: String },

    #[error("History entry already exists: {id}")]
    DuplicateEntry { id: String },

    #[error("History entry {id} is older than every retained entry and was not stored")]
    Evicted { id: String },

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Remote assessment transport errors.
///
/// These never escape the client as errors; they are flattened into an
/// [`Outcome::Failure`](crate::assessment::Outcome) reason.
#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("Missing API key: set LYZR_API_KEY")]
    MissingApiKey,

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("{message}")]
    Rejected { message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Report schema violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing field `{field}`")]
    MissingField { field: String },

    #[error("field `{field}` has the wrong type: expected {expected}")]
    WrongType { field: String, expected: String },
}

impl ValidationError {
    /// Dotted path of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingField { field } => field,
            ValidationError::WrongType { field, .. } => field,
        }
    }
}

/// Errors surfaced by the session orchestrator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("An analysis is already running")]
    Busy,

    #[error("{reason}")]
    RemoteFailure { reason: String },

    #[error("Analysis failed: {0}")]
    InvalidReport(#[from] ValidationError),
}

/// Credential provisioning errors
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Invalid API key format. Must start with \"sk-\"")]
    InvalidFormat,

    #[error("Failed to write configuration file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for remote assessment operations
pub type AssessmentResult<T> = Result<T, AssessmentError>;

/// Result type alias for report validation
pub type ValidationResult<T> = Result<T, ValidationError>;
