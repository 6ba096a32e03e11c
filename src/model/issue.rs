//! Issue and issue-link records.

use serde::{Deserialize, Serialize};

/// A mirrored issue.
///
/// `project_id` is a soft reference: it may be absent, and it may name a
/// project that has not been synced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    /// Human-readable key (e.g. "OPS-12"), unique
    pub key: String,
    pub project_id: Option<String>,
    pub summary: Option<String>,
    pub status: Option<String>,
    pub issue_type: Option<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

/// A directed edge between two issues.
///
/// Derived from the links embedded in an issue payload. One remote link
/// entry normally yields one edge; see [`crate::sync::mapper::derive_links`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLink {
    /// Remote link id, or `{issue}-{type}-{counterpart}` when absent
    pub link_id: String,
    /// Link type name (e.g. "Blocks")
    pub type_name: Option<String>,
    /// Inward phrase (e.g. "is blocked by")
    pub inward_description: Option<String>,
    /// Outward phrase (e.g. "blocks")
    pub outward_description: Option<String>,
    pub source_issue_id: String,
    pub target_issue_id: String,
}
