//! Worklog query command.

use crate::cli::WorklogsArgs;
use crate::config::resolve_db_path;
use crate::error::Result;
use crate::model::Worklog;
use crate::storage::SqliteStorage;
use crate::sync::{WorklogQuery, get_worklogs};
use chrono::DateTime;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct WorklogsOutput<'a> {
    worklogs: &'a [Worklog],
}

/// Execute the worklogs command.
///
/// The selector is validated before the database is touched.
///
/// # Errors
///
/// Returns an invalid-argument error without a usable selector, a
/// configuration error without a database target, or a storage error.
pub fn execute(args: &WorklogsArgs, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let query = WorklogQuery::from_parts(
        args.issue_id.as_deref(),
        args.issue_key.as_deref(),
        args.limit,
    )?;

    let db_path = resolve_db_path(db_path.map(PathBuf::as_path))?;
    let storage = SqliteStorage::open(&db_path)?;
    let worklogs = get_worklogs(&storage, &query)?;

    if json {
        let output = WorklogsOutput {
            worklogs: &worklogs,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if worklogs.is_empty() {
        println!("No worklogs found.");
        return Ok(());
    }

    for worklog in &worklogs {
        print_worklog(worklog);
    }

    Ok(())
}

fn print_worklog(worklog: &Worklog) {
    let started = worklog
        .started_at
        .or(worklog.updated_at)
        .and_then(DateTime::from_timestamp_millis)
        .map_or_else(|| "-".to_string(), |dt| dt.format("%Y-%m-%d %H:%M").to_string());
    let author = worklog
        .author_display_name
        .as_deref()
        .or(worklog.author_account_id.as_deref())
        .unwrap_or("unknown");

    println!(
        "{}  {}  {}  {}",
        worklog.worklog_id.bold(),
        started,
        format_duration(worklog.time_spent_seconds),
        author.cyan()
    );
    if let Some(comment) = &worklog.comment {
        println!("    {}", comment.dimmed());
    }
}

fn format_duration(seconds: Option<i64>) -> String {
    match seconds {
        None => "-".to_string(),
        Some(s) if s >= 3600 => format!("{}h {:02}m", s / 3600, (s % 3600) / 60),
        Some(s) => format!("{}m", s / 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(None), "-");
        assert_eq!(format_duration(Some(5400)), "1h 30m");
        assert_eq!(format_duration(Some(900)), "15m");
    }
}
