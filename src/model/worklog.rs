//! Worklog record.

use serde::{Deserialize, Serialize};

/// A mirrored work-log entry.
///
/// Owned by its issue: deleting the issue row cascades to its worklogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worklog {
    pub worklog_id: String,
    pub issue_id: String,
    pub author_account_id: Option<String>,
    pub author_display_name: Option<String>,
    pub time_spent_seconds: Option<i64>,
    pub started_at: Option<i64>,
    pub updated_at: Option<i64>,
    /// Visibility restriction kind ("group", "role")
    pub visibility_type: Option<String>,
    /// Visibility restriction target
    pub visibility_value: Option<String>,
    /// Comment flattened to plain text
    pub comment: Option<String>,
}
