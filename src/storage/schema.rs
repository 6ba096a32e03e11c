//! Database schema definitions.
//!
//! Four tables mirror the remote tracker: projects, issues, issue links and
//! worklogs. Every statement is `IF NOT EXISTS` so the schema can be applied
//! at the start of every operation.

use rusqlite::{Connection, Result};

/// Current schema version, recorded in `schema_migrations`.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the mirror database.
///
/// Timestamps are INTEGER Unix milliseconds.
///
/// Issues reference projects softly (no FOREIGN KEY) so an issue whose
/// project was never synced is still stored. Worklogs belong to their
/// issue: deleting an issue removes its worklogs through a trigger, while
/// inserting a worklog before its issue is tolerated.
pub const SCHEMA_SQL: &str = r#"
-- ====================
-- Schema Version Tracking
-- ====================

CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at INTEGER NOT NULL
);

-- ====================
-- Mirror Tables
-- ====================

CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    key TEXT NOT NULL,
    name TEXT NOT NULL,
    project_type TEXT,
    lead_account_id TEXT,
    last_synced_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS issues (
    id TEXT PRIMARY KEY,
    key TEXT NOT NULL UNIQUE,
    project_id TEXT,
    summary TEXT,
    status TEXT,
    issue_type TEXT,
    created_at INTEGER,
    updated_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_issues_project_id ON issues(project_id);

CREATE TABLE IF NOT EXISTS issue_links (
    link_id TEXT PRIMARY KEY,
    type_name TEXT,
    inward_description TEXT,
    outward_description TEXT,
    source_issue_id TEXT NOT NULL,
    target_issue_id TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_issue_links_source ON issue_links(source_issue_id);
CREATE INDEX IF NOT EXISTS idx_issue_links_target ON issue_links(target_issue_id);

CREATE TABLE IF NOT EXISTS worklogs (
    worklog_id TEXT PRIMARY KEY,
    issue_id TEXT NOT NULL,
    author_account_id TEXT,
    author_display_name TEXT,
    time_spent_seconds INTEGER,
    started_at INTEGER,
    updated_at INTEGER,
    visibility_type TEXT,
    visibility_value TEXT,
    comment TEXT
);

CREATE INDEX IF NOT EXISTS idx_worklogs_issue_id ON worklogs(issue_id);

-- Worklogs are owned by their issue
CREATE TRIGGER IF NOT EXISTS issues_delete_worklogs
AFTER DELETE ON issues
BEGIN
    DELETE FROM worklogs WHERE issue_id = OLD.id;
END;
"#;

/// Apply the schema to the database.
///
/// This uses `execute_batch` to run the entire DDL script.
/// It is idempotent because all statements use `IF NOT EXISTS`.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;

    conn.execute_batch(SCHEMA_SQL)?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
        rusqlite::params![
            format!("v{CURRENT_SCHEMA_VERSION}"),
            chrono::Utc::now().timestamp_millis()
        ],
    )?;

    Ok(())
}
