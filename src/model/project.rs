//! Project record.

use serde::{Deserialize, Serialize};

/// A mirrored project.
///
/// `id` is stable across syncs; every other column is overwritten on re-sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Remote project id
    pub id: String,

    /// Short project key (e.g. "OPS")
    pub key: String,

    /// Display name
    pub name: String,

    /// Project type key ("software", "business", ...)
    pub project_type: Option<String>,

    /// Account id of the project lead
    pub lead_account_id: Option<String>,

    /// When the sync that wrote this row started (Unix milliseconds)
    pub last_synced_at: i64,
}
