//! Sync command implementations.
//!
//! The database target is resolved before the remote settings so that a
//! missing database fails the command before anything is fetched.

use crate::cli::SyncCommands;
use crate::config::{resolve_db_path, resolve_remote_config};
use crate::error::{Error, Result};
use crate::remote::JiraClient;
use crate::storage::SqliteStorage;
use crate::sync::{SyncEngine, SyncKind, SyncSummary};
use colored::Colorize;
use std::path::PathBuf;

/// Execute a sync command.
///
/// # Errors
///
/// Returns a configuration error if the database or remote is not
/// configured, or the first remote or storage error of the sync.
pub fn execute(command: SyncCommands, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let kind = SyncKind::from(command);

    let db_path = resolve_db_path(db_path.map(PathBuf::as_path))?;
    let remote = resolve_remote_config()?;

    let mut storage = SqliteStorage::open(&db_path)?;
    let client = JiraClient::new(remote)?;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to start async runtime: {e}")))?;
    let summary = runtime.block_on(SyncEngine::new(&mut storage, &client).run(kind))?;

    if json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        print_summary(kind, &summary, client.base_url());
    }

    Ok(())
}

fn print_summary(kind: SyncKind, summary: &SyncSummary, base_url: &str) {
    println!("{} {}", "Synced".green().bold(), base_url);
    println!();

    let rows = [
        ("Projects", summary.projects),
        ("Issues", summary.issues),
        ("Links", summary.links),
        ("Worklogs", summary.worklogs),
    ];
    for (label, count) in rows {
        if let Some(count) = count {
            println!("  {label:<10} {count}");
        }
    }

    if kind == SyncKind::All {
        println!();
        println!("  Total: {} records", summary.total());
    }
}
