//! Resolution of the Gemini API key.
//!
//! The secrets file wins over the process environment. The key is resolved
//! once at startup; a missing key stops `serve` and `analyze`.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the credential in the secrets file and the environment
pub const API_KEY_NAME: &str = "GEMINI_API_KEY";
/// Secrets file consulted when `SECRETS_FILE` is unset
pub const DEFAULT_SECRETS_FILE: &str = "secrets.yaml";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Please set GEMINI_API_KEY in the secrets file or the environment")]
    Missing,

    #[error("Failed to read secrets file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse secrets file {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Gemini API key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Where the key was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    SecretsFile(PathBuf),
    Environment,
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::SecretsFile(path) => write!(f, "secrets file {}", path.display()),
            KeySource::Environment => write!(f, "environment"),
        }
    }
}

/// Look the key up in `secrets_file` (if any) and then in `env`.
///
/// An explicitly named secrets file must exist; the default one is
/// optional. Empty values count as absent.
pub fn resolve(
    secrets_file: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(ApiKey, KeySource), CredentialError> {
    let (path, required) = match secrets_file {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_SECRETS_FILE), false),
    };

    if required || path.exists() {
        if let Some(key) = read_secrets(&path)? {
            return Ok((ApiKey(key), KeySource::SecretsFile(path)));
        }
    }

    match env(API_KEY_NAME).filter(|key| !key.trim().is_empty()) {
        Some(key) => Ok((ApiKey(key), KeySource::Environment)),
        None => Err(CredentialError::Missing),
    }
}

/// Resolve using `SECRETS_FILE` and the real process environment
pub fn resolve_from_env() -> Result<(ApiKey, KeySource), CredentialError> {
    let secrets = std::env::var_os("SECRETS_FILE").map(PathBuf::from);
    resolve(secrets.as_deref(), |name| std::env::var(name).ok())
}

fn read_secrets(path: &Path) -> Result<Option<String>, CredentialError> {
    let content = std::fs::read_to_string(path).map_err(|source| CredentialError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(None);
    }

    let secrets: HashMap<String, serde_yaml::Value> =
        serde_yaml::from_str(&content).map_err(|source| CredentialError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(secrets
        .get(API_KEY_NAME)
        .and_then(serde_yaml::Value::as_str)
        .filter(|key| !key.trim().is_empty())
        .map(str::to_string))
}
