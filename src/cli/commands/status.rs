//! Status command implementation.

use crate::config::resolve_db_path;
use crate::error::Result;
use crate::storage::SqliteStorage;
use chrono::DateTime;
use colored::Colorize;
use std::path::PathBuf;

/// Execute the status command.
///
/// Read-only: reports row counts and the most recent project sync time.
///
/// # Errors
///
/// Returns a configuration error without a database target, or a storage
/// error if the counts cannot be read.
pub fn execute(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let db_path = resolve_db_path(db_path.map(PathBuf::as_path))?;
    let storage = SqliteStorage::open(&db_path)?;
    let counts = storage.get_counts()?;

    if json {
        let output = serde_json::json!({
            "database": db_path.display().to_string(),
            "counts": counts,
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{} {}", "Mirror".cyan().bold(), db_path.display());
    println!();
    println!("  Projects:  {}", counts.projects);
    println!("  Issues:    {}", counts.issues);
    println!("  Links:     {}", counts.issue_links);
    println!("  Worklogs:  {}", counts.worklogs);

    let last = counts
        .last_synced_at
        .and_then(DateTime::from_timestamp_millis)
        .map_or_else(|| "never".to_string(), |dt| dt.to_rfc3339());
    println!();
    println!("  Last project sync: {last}");

    Ok(())
}
