//! SQLite storage implementation.
//!
//! This module is the only writer of the mirror database. Every write goes
//! through [`SqliteStorage::write_batch`]: one IMMEDIATE transaction per
//! batch, one `INSERT ... ON CONFLICT DO UPDATE` per record, commit on
//! success and full rollback on the first failing record.

use crate::error::Result;
use crate::model::{Issue, IssueLink, Project, Worklog};
use crate::storage::schema::apply_schema;
use rusqlite::{Connection, OptionalExtension, Row, Transaction};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Row counts across the mirror tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MirrorCounts {
    /// Number of projects.
    pub projects: usize,
    /// Number of issues.
    pub issues: usize,
    /// Number of issue links.
    pub issue_links: usize,
    /// Number of worklogs.
    pub worklogs: usize,
    /// Most recent project sync time (Unix milliseconds).
    pub last_synced_at: Option<i64>,
}

impl MirrorCounts {
    /// Returns total number of rows.
    #[must_use]
    pub fn total(&self) -> usize {
        self.projects + self.issues + self.issue_links + self.worklogs
    }
}

const WORKLOG_COLUMNS: &str = "w.worklog_id, w.issue_id, w.author_account_id, w.author_display_name, \
     w.time_spent_seconds, w.started_at, w.updated_at, w.visibility_type, w.visibility_value, w.comment";

impl SqliteStorage {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a database with an optional busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open_with_timeout(path: &Path, timeout_ms: Option<u64>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        if let Some(timeout) = timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        } else {
            // Default 5 second timeout
            conn.busy_timeout(Duration::from_secs(5))?;
        }

        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Re-apply the idempotent schema DDL.
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL fails.
    pub fn ensure_schema(&self) -> Result<()> {
        apply_schema(&self.conn)?;
        Ok(())
    }

    /// Write a batch of records in a single transaction.
    ///
    /// This method:
    /// 1. Returns `Ok(0)` without touching the database for an empty batch
    /// 2. Begins an IMMEDIATE transaction (for write locking)
    /// 3. Runs `write` once per record, in order
    /// 4. Commits, or rolls back the whole batch on the first error
    ///
    /// The transaction guard rolls back on drop, so the early `?` return
    /// releases it as well.
    ///
    /// # Errors
    ///
    /// Returns the first record's error, after the batch has been rolled back.
    pub fn write_batch<T, F>(&mut self, op: &str, records: &[T], write: F) -> Result<usize>
    where
        F: Fn(&Transaction, &T) -> rusqlite::Result<usize>,
    {
        if records.is_empty() {
            return Ok(0);
        }

        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        for record in records {
            if let Err(e) = write(&tx, record) {
                debug!(op, error = %e, "Batch failed, rolling back");
                if let Err(rollback) = tx.rollback() {
                    warn!(op, error = %rollback, "Rollback failed");
                }
                return Err(e.into());
            }
        }

        tx.commit()?;
        debug!(op, count = records.len(), "Batch committed");

        Ok(records.len())
    }

    // ======================
    // Upsert Operations
    // ======================

    /// Upsert a batch of projects.
    ///
    /// # Errors
    ///
    /// Returns an error if any upsert fails; nothing from the batch is kept.
    pub fn upsert_projects(&mut self, projects: &[Project]) -> Result<usize> {
        self.write_batch("upsert_projects", projects, |tx, p| {
            tx.execute(
                "INSERT INTO projects (id, key, name, project_type, lead_account_id, last_synced_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                   key = excluded.key,
                   name = excluded.name,
                   project_type = excluded.project_type,
                   lead_account_id = excluded.lead_account_id,
                   last_synced_at = excluded.last_synced_at",
                rusqlite::params![
                    p.id,
                    p.key,
                    p.name,
                    p.project_type,
                    p.lead_account_id,
                    p.last_synced_at,
                ],
            )
        })
    }

    /// Upsert a batch of issues.
    ///
    /// # Errors
    ///
    /// Returns an error if any upsert fails (e.g. a key already owned by a
    /// different issue id); nothing from the batch is kept.
    pub fn upsert_issues(&mut self, issues: &[Issue]) -> Result<usize> {
        self.write_batch("upsert_issues", issues, |tx, i| {
            tx.execute(
                "INSERT INTO issues (id, key, project_id, summary, status, issue_type, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                   key = excluded.key,
                   project_id = excluded.project_id,
                   summary = excluded.summary,
                   status = excluded.status,
                   issue_type = excluded.issue_type,
                   created_at = excluded.created_at,
                   updated_at = excluded.updated_at",
                rusqlite::params![
                    i.id,
                    i.key,
                    i.project_id,
                    i.summary,
                    i.status,
                    i.issue_type,
                    i.created_at,
                    i.updated_at,
                ],
            )
        })
    }

    /// Upsert a batch of issue links.
    ///
    /// # Errors
    ///
    /// Returns an error if any upsert fails; nothing from the batch is kept.
    pub fn upsert_issue_links(&mut self, links: &[IssueLink]) -> Result<usize> {
        self.write_batch("upsert_issue_links", links, |tx, l| {
            tx.execute(
                "INSERT INTO issue_links (link_id, type_name, inward_description, outward_description, source_issue_id, target_issue_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(link_id) DO UPDATE SET
                   type_name = excluded.type_name,
                   inward_description = excluded.inward_description,
                   outward_description = excluded.outward_description,
                   source_issue_id = excluded.source_issue_id,
                   target_issue_id = excluded.target_issue_id",
                rusqlite::params![
                    l.link_id,
                    l.type_name,
                    l.inward_description,
                    l.outward_description,
                    l.source_issue_id,
                    l.target_issue_id,
                ],
            )
        })
    }

    /// Upsert a batch of worklogs.
    ///
    /// # Errors
    ///
    /// Returns an error if any upsert fails; nothing from the batch is kept.
    pub fn upsert_worklogs(&mut self, worklogs: &[Worklog]) -> Result<usize> {
        self.write_batch("upsert_worklogs", worklogs, |tx, w| {
            tx.execute(
                "INSERT INTO worklogs (worklog_id, issue_id, author_account_id, author_display_name, time_spent_seconds, started_at, updated_at, visibility_type, visibility_value, comment)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(worklog_id) DO UPDATE SET
                   issue_id = excluded.issue_id,
                   author_account_id = excluded.author_account_id,
                   author_display_name = excluded.author_display_name,
                   time_spent_seconds = excluded.time_spent_seconds,
                   started_at = excluded.started_at,
                   updated_at = excluded.updated_at,
                   visibility_type = excluded.visibility_type,
                   visibility_value = excluded.visibility_value,
                   comment = excluded.comment",
                rusqlite::params![
                    w.worklog_id,
                    w.issue_id,
                    w.author_account_id,
                    w.author_display_name,
                    w.time_spent_seconds,
                    w.started_at,
                    w.updated_at,
                    w.visibility_type,
                    w.visibility_value,
                    w.comment,
                ],
            )
        })
    }

    // ======================
    // Read Operations
    // ======================

    /// Get a project by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_project(&self, id: &str) -> Result<Option<Project>> {
        let project = self
            .conn
            .query_row(
                "SELECT id, key, name, project_type, lead_account_id, last_synced_at
                 FROM projects WHERE id = ?1",
                [id],
                |row| {
                    Ok(Project {
                        id: row.get(0)?,
                        key: row.get(1)?,
                        name: row.get(2)?,
                        project_type: row.get(3)?,
                        lead_account_id: row.get(4)?,
                        last_synced_at: row.get(5)?,
                    })
                },
            )
            .optional()?;

        Ok(project)
    }

    /// Get an issue by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_issue(&self, id: &str) -> Result<Option<Issue>> {
        let issue = self
            .conn
            .query_row(
                "SELECT id, key, project_id, summary, status, issue_type, created_at, updated_at
                 FROM issues WHERE id = ?1",
                [id],
                |row| {
                    Ok(Issue {
                        id: row.get(0)?,
                        key: row.get(1)?,
                        project_id: row.get(2)?,
                        summary: row.get(3)?,
                        status: row.get(4)?,
                        issue_type: row.get(5)?,
                        created_at: row.get(6)?,
                        updated_at: row.get(7)?,
                    })
                },
            )
            .optional()?;

        Ok(issue)
    }

    /// List all issue links ordered by link id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_issue_links(&self) -> Result<Vec<IssueLink>> {
        let mut stmt = self.conn.prepare(
            "SELECT link_id, type_name, inward_description, outward_description, source_issue_id, target_issue_id
             FROM issue_links ORDER BY link_id",
        )?;

        let links = stmt
            .query_map([], |row| {
                Ok(IssueLink {
                    link_id: row.get(0)?,
                    type_name: row.get(1)?,
                    inward_description: row.get(2)?,
                    outward_description: row.get(3)?,
                    source_issue_id: row.get(4)?,
                    target_issue_id: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(links)
    }

    /// Worklogs of one issue by issue id, most recent first.
    ///
    /// Ordered by start time, falling back to update time.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_worklogs_by_issue_id(&self, issue_id: &str, limit: u32) -> Result<Vec<Worklog>> {
        let sql = format!(
            "SELECT {WORKLOG_COLUMNS}
             FROM worklogs w
             WHERE w.issue_id = ?1
             ORDER BY COALESCE(w.started_at, w.updated_at) DESC
             LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params![issue_id, limit], map_worklog_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Worklogs of one issue by issue key, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_worklogs_by_issue_key(&self, issue_key: &str, limit: u32) -> Result<Vec<Worklog>> {
        let sql = format!(
            "SELECT {WORKLOG_COLUMNS}
             FROM worklogs w
             JOIN issues i ON i.id = w.issue_id
             WHERE i.key = ?1
             ORDER BY COALESCE(w.started_at, w.updated_at) DESC
             LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params![issue_key, limit], map_worklog_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Row counts for every mirror table.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_counts(&self) -> Result<MirrorCounts> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(usize::try_from(n).unwrap_or(0))
        };

        let last_synced_at: Option<i64> =
            self.conn
                .query_row("SELECT MAX(last_synced_at) FROM projects", [], |row| row.get(0))?;

        Ok(MirrorCounts {
            projects: count("projects")?,
            issues: count("issues")?,
            issue_links: count("issue_links")?,
            worklogs: count("worklogs")?,
            last_synced_at,
        })
    }
}

fn map_worklog_row(row: &Row) -> rusqlite::Result<Worklog> {
    Ok(Worklog {
        worklog_id: row.get(0)?,
        issue_id: row.get(1)?,
        author_account_id: row.get(2)?,
        author_display_name: row.get(3)?,
        time_spent_seconds: row.get(4)?,
        started_at: row.get(5)?,
        updated_at: row.get(6)?,
        visibility_type: row.get(7)?,
        visibility_value: row.get(8)?,
        comment: row.get(9)?,
    })
}
