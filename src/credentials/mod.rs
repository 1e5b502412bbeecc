//! Provisioning of the agent API key into the runtime `.env` file.

use std::path::Path;
use tracing::info;

use crate::config::SecretString;
use crate::error::CredentialError;

/// Required prefix of an agent API key.
pub const API_KEY_PREFIX: &str = "sk-";

/// Check the key format, returning the trimmed key.
pub fn parse_api_key(value: &str) -> Result<SecretString, CredentialError> {
    let trimmed = value.trim();
    if !trimmed.starts_with(API_KEY_PREFIX) {
        return Err(CredentialError::InvalidFormat);
    }
    Ok(SecretString::new(trimmed))
}

/// Validate `value` and write it to the configuration file at `env_path`.
///
/// The file is replaced. A restart is needed for the key to take effect.
pub fn provision_api_key(value: &str, env_path: &Path) -> Result<(), CredentialError> {
    let key = parse_api_key(value)?;

    if let Some(parent) = env_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let content = format!(
        "# Environment variables for bishforge\n# Updated via set-key\n\nLYZR_API_KEY={}\n",
        key.expose()
    );
    std::fs::write(env_path, content)?;

    info!(path = %env_path.display(), "API key updated");
    Ok(())
}
