mod secret;

pub use secret::SecretString;

use std::env;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Manager agent that produces the multi-dimensional validation report.
pub const DEFAULT_AGENT_ID: &str = "698597247551cb7920ffe8ba";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub agent: AgentConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
    /// Runtime configuration file the `set-key` command writes to.
    pub env_file: PathBuf,
}

/// Remote agent API configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub agent_id: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // The file set-key writes is the file loaded here
        let env_file = match env::var("ENV_FILE_PATH") {
            Ok(path) => {
                let path = PathBuf::from(path);
                load_env_file(&path)?;
                path
            }
            Err(_) => {
                // Load .env file if present (ignore errors if not found)
                let _ = dotenvy::dotenv();
                PathBuf::from(".env")
            }
        };

        let agent = AgentConfig {
            api_key: env::var("LYZR_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .map(SecretString::new),
            base_url: env::var("LYZR_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            agent_id: env::var("AGENT_ID").unwrap_or_else(|_| DEFAULT_AGENT_ID.to_string()),
        };

        if agent.agent_id.trim().is_empty() {
            return Err(AppError::Config {
                message: "AGENT_ID cannot be empty".to_string(),
            });
        }

        let database = DatabaseConfig {
            path: PathBuf::from(
                env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/bishforge.db".to_string()),
            ),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(120_000),
        };

        Ok(Config {
            agent,
            database,
            logging,
            request,
            env_file,
        })
    }
}

/// Load `path` into the environment. A missing file is not an error.
fn load_env_file(path: &Path) -> Result<(), AppError> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(AppError::Config {
            message: format!("Failed to load {}: {}", path.display(), e),
        }),
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 120_000,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "http://localhost:3000".to_string(),
            agent_id: DEFAULT_AGENT_ID.to_string(),
        }
    }
}
