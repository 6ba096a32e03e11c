//! Sync orchestration.
//!
//! [`SyncEngine`] pulls pages from the remote, maps them to canonical
//! records and upserts them in batches. Every operation is a full scan;
//! nothing is pruned and no cursor is kept between runs.
//!
//! Each stage commits on its own. If a later stage fails, the rows written
//! by earlier stages stay in the store.

use tracing::info;

use crate::error::Result;
use crate::model::Worklog;
use crate::remote::{RemoteApi, RemoteIssue, RemoteProject, RemoteWorklog};
use crate::storage::SqliteStorage;

use super::fetch::{ISSUE_FIELDS, LINK_FIELDS, Paginator};
use super::mapper::{MappedIssue, derive_links, map_issue, map_project, map_worklog};
use super::types::{IssueSelector, SyncKind, SyncSummary, WorklogQuery};

/// Runs sync operations against one store and one remote.
pub struct SyncEngine<'a, R> {
    storage: &'a mut SqliteStorage,
    remote: &'a R,
}

impl<'a, R: RemoteApi> SyncEngine<'a, R> {
    /// Create an engine over an open store and a remote.
    pub fn new(storage: &'a mut SqliteStorage, remote: &'a R) -> Self {
        Self { storage, remote }
    }

    /// Run one sync operation.
    ///
    /// # Errors
    ///
    /// Returns the first remote, mapping or storage error.
    pub async fn run(&mut self, kind: SyncKind) -> Result<SyncSummary> {
        info!(op = kind.as_str(), "Sync started");
        let summary = match kind {
            SyncKind::Projects => self.sync_projects().await?,
            SyncKind::Issues => self.sync_issues().await?,
            SyncKind::Relations => self.sync_relations().await?,
            SyncKind::Worklogs => self.sync_worklogs().await?,
            SyncKind::All => self.sync_all().await?,
        };
        info!(op = kind.as_str(), total = summary.total(), "Sync finished");
        Ok(summary)
    }

    /// Mirror every project.
    ///
    /// # Errors
    ///
    /// Returns an error if a page request or the batch write fails.
    pub async fn sync_projects(&mut self) -> Result<SyncSummary> {
        self.storage.ensure_schema()?;
        let projects = self.write_projects().await?;
        Ok(SyncSummary {
            projects: Some(projects),
            ..Default::default()
        })
    }

    /// Mirror every issue.
    ///
    /// # Errors
    ///
    /// Returns an error if a page request or the batch write fails.
    pub async fn sync_issues(&mut self) -> Result<SyncSummary> {
        self.storage.ensure_schema()?;
        let mapped = self.fetch_issues(ISSUE_FIELDS).await?;
        let issues = self.write_issues(&mapped)?;
        Ok(SyncSummary {
            issues: Some(issues),
            ..Default::default()
        })
    }

    /// Mirror issue-to-issue links.
    ///
    /// Only the link field of each issue is requested; issue rows are not
    /// written.
    ///
    /// # Errors
    ///
    /// Returns an error if a page request or the batch write fails.
    pub async fn sync_relations(&mut self) -> Result<SyncSummary> {
        self.storage.ensure_schema()?;
        let mapped = self.fetch_issues(LINK_FIELDS).await?;
        let links = self.write_links(&mapped)?;
        Ok(SyncSummary {
            links: Some(links),
            ..Default::default()
        })
    }

    /// Mirror the worklogs of every issue.
    ///
    /// Issues are processed in listing order, one transaction per issue.
    /// The first failure stops the pass; issues already written stay
    /// written.
    ///
    /// # Errors
    ///
    /// Returns an error if a page request or a batch write fails.
    pub async fn sync_worklogs(&mut self) -> Result<SyncSummary> {
        self.storage.ensure_schema()?;
        let ids: Vec<RemoteIssue> = Paginator::issue_ids(self.remote).collect_all().await?;
        let ids: Vec<&str> = ids.iter().map(|i| i.id.as_str()).collect();
        let worklogs = self.write_worklogs(&ids).await?;
        Ok(SyncSummary {
            worklogs: Some(worklogs),
            ..Default::default()
        })
    }

    /// Projects, issues, links and worklogs in one pass.
    ///
    /// Issues are fetched once; links and the worklog issue list are both
    /// derived from that single fetch.
    ///
    /// # Errors
    ///
    /// Returns the first error of any stage.
    pub async fn sync_all(&mut self) -> Result<SyncSummary> {
        self.storage.ensure_schema()?;

        let projects = self.write_projects().await?;

        let mapped = self.fetch_issues(ISSUE_FIELDS).await?;
        let issues = self.write_issues(&mapped)?;
        let links = self.write_links(&mapped)?;

        let ids: Vec<&str> = mapped.iter().map(|m| m.issue.id.as_str()).collect();
        let worklogs = self.write_worklogs(&ids).await?;

        Ok(SyncSummary {
            projects: Some(projects),
            issues: Some(issues),
            links: Some(links),
            worklogs: Some(worklogs),
        })
    }

    /// Worklogs of one issue, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_worklogs(&self, query: &WorklogQuery) -> Result<Vec<Worklog>> {
        get_worklogs(&*self.storage, query)
    }

    async fn write_projects(&mut self) -> Result<usize> {
        let synced_at = chrono::Utc::now().timestamp_millis();
        let remote: Vec<RemoteProject> = Paginator::projects(self.remote).collect_all().await?;
        let projects: Vec<_> = remote.iter().map(|p| map_project(p, synced_at)).collect();
        let written = self.storage.upsert_projects(&projects)?;
        info!(count = written, "Projects written");
        Ok(written)
    }

    async fn fetch_issues(&self, fields: &[&str]) -> Result<Vec<MappedIssue>> {
        let remote: Vec<RemoteIssue> = Paginator::issues(self.remote, fields).collect_all().await?;
        Ok(remote.iter().map(map_issue).collect())
    }

    fn write_issues(&mut self, mapped: &[MappedIssue]) -> Result<usize> {
        let issues: Vec<_> = mapped.iter().map(|m| m.issue.clone()).collect();
        let written = self.storage.upsert_issues(&issues)?;
        info!(count = written, "Issues written");
        Ok(written)
    }

    fn write_links(&mut self, mapped: &[MappedIssue]) -> Result<usize> {
        let links = derive_links(mapped);
        let written = self.storage.upsert_issue_links(&links)?;
        info!(count = written, "Issue links written");
        Ok(written)
    }

    async fn write_worklogs(&mut self, issue_ids: &[&str]) -> Result<usize> {
        let mut written = 0;
        for issue_id in issue_ids {
            let remote: Vec<RemoteWorklog> =
                Paginator::worklogs(self.remote, issue_id).collect_all().await?;
            let worklogs: Vec<_> = remote.iter().map(|w| map_worklog(issue_id, w)).collect();
            written += self.storage.upsert_worklogs(&worklogs)?;
        }
        info!(count = written, issues = issue_ids.len(), "Worklogs written");
        Ok(written)
    }
}

/// Worklogs of the selected issue, most recent first.
///
/// # Errors
///
/// Returns an error if the schema cannot be applied or the query fails.
pub fn get_worklogs(storage: &SqliteStorage, query: &WorklogQuery) -> Result<Vec<Worklog>> {
    storage.ensure_schema()?;
    match &query.selector {
        IssueSelector::Id(id) => storage.get_worklogs_by_issue_id(id, query.limit),
        IssueSelector::Key(key) => storage.get_worklogs_by_issue_key(key, query.limit),
    }
}
