//! Configuration management.
//!
//! Resolves the two external targets jsync needs:
//! - **Database**: the SQLite file the mirror is written to
//! - **Remote**: the Jira base URL and credentials
//!
//! Resolution priority is always: explicit flag > environment > config file
//! (`~/.jsync/config.json`). Unlike a local-first tool there is no implicit
//! default database location. An unconfigured target is a hard
//! [`Error::Config`], raised the first time an operation asks for it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the database file.
pub const DB_ENV: &str = "JSYNC_DB";
/// Environment variable naming the Jira site, e.g. `https://acme.atlassian.net`.
pub const BASE_URL_ENV: &str = "JIRA_BASE_URL";
/// Environment variable holding the account email for basic auth.
pub const EMAIL_ENV: &str = "JIRA_EMAIL";
/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "JIRA_API_TOKEN";

/// Contents of `~/.jsync/config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsyncConfig {
    /// Path of the SQLite database.
    #[serde(default)]
    pub database: Option<String>,

    /// Remote connection settings.
    #[serde(default)]
    pub jira: Option<JiraSettings>,
}

/// Remote settings as stored in the config file. Every field is optional so
/// that env vars can fill the gaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraSettings {
    pub base_url: Option<String>,
    pub email: Option<String>,
    pub api_token: Option<String>,
}

/// Fully resolved remote connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Site root without a trailing slash.
    pub base_url: String,
    /// Account email. When absent the token is sent as a bearer token.
    pub email: Option<String>,
    pub api_token: String,
}

/// Get the jsync home directory (`~/.jsync`).
#[must_use]
pub fn jsync_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".jsync"))
}

/// Get the config file path.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    jsync_dir().map(|dir| dir.join("config.json"))
}

/// Load the config file, treating a missing file as empty settings.
///
/// # Errors
///
/// Returns [`Error::Config`] if the file exists but cannot be read or parsed.
pub fn load_config() -> Result<JsyncConfig> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(JsyncConfig::default()),
    }
}

/// Load a config file from an explicit path.
///
/// # Errors
///
/// Returns [`Error::Config`] if the file exists but cannot be read or parsed.
pub fn load_config_from(path: &Path) -> Result<JsyncConfig> {
    if !path.exists() {
        return Ok(JsyncConfig::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))
}

/// Read an env var, treating blank values as unset.
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(non_blank)
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Resolve the database path.
///
/// Priority:
/// 1. `explicit_path` (the `--db` flag)
/// 2. `JSYNC_DB` environment variable
/// 3. `database` in `~/.jsync/config.json`
///
/// # Errors
///
/// Returns [`Error::Config`] when none of the sources yields a path.
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Result<PathBuf> {
    let file = load_config()?;
    resolve_db_path_from(explicit_path, env_value(DB_ENV), &file)
}

/// Pure form of [`resolve_db_path`] with the environment passed in.
///
/// # Errors
///
/// Returns [`Error::Config`] when none of the sources yields a path.
pub fn resolve_db_path_from(
    explicit_path: Option<&Path>,
    env_path: Option<String>,
    file: &JsyncConfig,
) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        if !path.as_os_str().is_empty() {
            return Ok(path.to_path_buf());
        }
    }

    if let Some(path) = env_path.and_then(non_blank) {
        return Ok(PathBuf::from(path));
    }

    if let Some(path) = file.database.clone().and_then(non_blank) {
        return Ok(PathBuf::from(path));
    }

    Err(Error::Config(format!(
        "database target is not configured (set --db or {DB_ENV})"
    )))
}

/// Resolve the remote connection settings from env and config file.
///
/// # Errors
///
/// Returns [`Error::Config`] when the base URL or API token is missing.
pub fn resolve_remote_config() -> Result<RemoteConfig> {
    let file = load_config()?;
    let overrides = JiraSettings {
        base_url: env_value(BASE_URL_ENV),
        email: env_value(EMAIL_ENV),
        api_token: env_value(TOKEN_ENV),
    };
    resolve_remote_config_from(&overrides, &file)
}

/// Pure form of [`resolve_remote_config`]: `overrides` wins field by field.
///
/// # Errors
///
/// Returns [`Error::Config`] when the base URL or API token is missing.
pub fn resolve_remote_config_from(
    overrides: &JiraSettings,
    file: &JsyncConfig,
) -> Result<RemoteConfig> {
    let stored = file.jira.clone().unwrap_or_default();

    let pick = |over: &Option<String>, fallback: Option<String>| {
        over.clone().and_then(non_blank).or(fallback.and_then(non_blank))
    };

    let base_url = pick(&overrides.base_url, stored.base_url)
        .ok_or_else(|| Error::Config(format!("{BASE_URL_ENV} is not configured")))?;
    let api_token = pick(&overrides.api_token, stored.api_token)
        .ok_or_else(|| Error::Config(format!("{TOKEN_ENV} is not configured")))?;
    let email = pick(&overrides.email, stored.email);

    Ok(RemoteConfig {
        base_url: base_url.trim_end_matches('/').to_string(),
        email,
        api_token,
    })
}
