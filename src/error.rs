//! Error types for jsync.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 4=validation, 6=fetch, 7=config, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use thiserror::Error;

/// Result type alias for jsync operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    DatabaseError,

    // Validation (exit 4)
    InvalidArgument,

    // Remote (exit 6)
    FetchError,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::DatabaseError => "DATABASE_ERROR",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::FetchError => "FETCH_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::DatabaseError => 2,
            Self::InvalidArgument => 4,
            Self::FetchError => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether a caller should retry with corrected input.
    ///
    /// Remote failures are not retryable here: no backoff is applied and
    /// the enclosing sync is aborted.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::InvalidArgument | Self::DatabaseError)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in jsync operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The remote API answered with a non-success status.
    #[error("Remote request {path} failed {status}: {body}")]
    Fetch {
        path: String,
        status: u16,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Fetch { .. } | Self::Http(_) => ErrorCode::FetchError,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Config(msg) if msg.contains("database") => Some(
                "Pass --db <path>, set JSYNC_DB, or add \"database\" to ~/.jsync/config.json"
                    .to_string(),
            ),
            Self::Config(msg) if msg.contains("JIRA") => Some(
                "Set JIRA_BASE_URL, JIRA_EMAIL and JIRA_API_TOKEN, \
                 or add a \"jira\" section to ~/.jsync/config.json"
                    .to_string(),
            ),
            Self::Fetch { status: 401 | 403, .. } => {
                Some("Check that the API token is valid and has browse permission.".to_string())
            }
            Self::Fetch { status: 429, .. } => {
                Some("Rate limited by the remote. Re-run the sync later.".to_string())
            }
            Self::InvalidArgument(msg) if msg.contains("issue") => {
                Some("Provide either --issue-id or --issue-key.".to_string())
            }
            _ => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Self::Fetch { status, .. } = self {
            obj["error"]["status"] = serde_json::Value::from(*status);
        }

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::Config("x".into()).exit_code(), 7);
        assert_eq!(Error::InvalidArgument("x".into()).exit_code(), 4);
        let fetch = Error::Fetch {
            path: "/rest/api/3/search".into(),
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(fetch.exit_code(), 6);
    }

    #[test]
    fn test_fetch_error_message_carries_status_and_body() {
        let err = Error::Fetch {
            path: "/rest/api/3/project/search".into(),
            status: 503,
            body: "unavailable".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("unavailable"));

        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "FETCH_ERROR");
        assert_eq!(json["error"]["status"], 503);
        assert_eq!(json["error"]["retryable"], false);
    }

    #[test]
    fn test_config_hint() {
        let err = Error::Config("database target is not configured".into());
        assert!(err.hint().unwrap().contains("JSYNC_DB"));
    }
}
