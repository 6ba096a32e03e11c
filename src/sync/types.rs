//! Sync operation kinds, summaries and worklog queries.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of worklog rows returned by a query.
pub const DEFAULT_WORKLOG_LIMIT: u32 = 50;

/// Upper bound on worklog rows returned by a query.
pub const MAX_WORKLOG_LIMIT: u32 = 500;

/// A sync operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncKind {
    /// Mirror every project.
    Projects,
    /// Mirror every issue.
    Issues,
    /// Mirror issue-to-issue links.
    Relations,
    /// Mirror every issue's worklogs.
    Worklogs,
    /// Projects, issues, relations and worklogs in one pass.
    All,
}

impl SyncKind {
    /// Stable operation name, used in logs and structured output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Projects => "sync.projects",
            Self::Issues => "sync.issues",
            Self::Relations => "sync.relations",
            Self::Worklogs => "sync.worklogs",
            Self::All => "sync.all",
        }
    }
}

impl std::fmt::Display for SyncKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SyncKind {
    type Err = String;

    /// Accepts both the bare name (`"issues"`) and the operation name
    /// (`"sync.issues"`).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.strip_prefix("sync.").unwrap_or(s) {
            "projects" => Ok(Self::Projects),
            "issues" => Ok(Self::Issues),
            "relations" => Ok(Self::Relations),
            "worklogs" => Ok(Self::Worklogs),
            "all" => Ok(Self::All),
            _ => Err(format!("Unknown sync kind: {s}")),
        }
    }
}

/// Records written by one sync operation.
///
/// Only the counts an operation actually touched are present; a projects
/// sync reports `projects` and nothing else.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worklogs: Option<usize>,
}

impl SyncSummary {
    /// Total records written across all kinds.
    #[must_use]
    pub fn total(&self) -> usize {
        [self.projects, self.issues, self.links, self.worklogs]
            .into_iter()
            .flatten()
            .sum()
    }
}

/// How a worklog query names its issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueSelector {
    Id(String),
    Key(String),
}

/// A validated worklog lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklogQuery {
    pub selector: IssueSelector,
    pub limit: u32,
}

impl WorklogQuery {
    /// Build a query from optional CLI-style inputs.
    ///
    /// Blank values count as missing. When both an id and a key are given
    /// the key is used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if neither an id nor a key is usable.
    pub fn from_parts(
        issue_id: Option<&str>,
        issue_key: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Self> {
        fn usable(s: Option<&str>) -> Option<&str> {
            s.map(str::trim).filter(|s| !s.is_empty())
        }

        let selector = match (usable(issue_id), usable(issue_key)) {
            (_, Some(key)) => IssueSelector::Key(key.to_string()),
            (Some(id), None) => IssueSelector::Id(id.to_string()),
            (None, None) => {
                return Err(Error::InvalidArgument(
                    "an issue id or issue key is required".to_string(),
                ));
            }
        };

        Ok(Self {
            selector,
            limit: clamp_limit(limit),
        })
    }
}

/// Default a missing limit, then clamp into `1..=MAX_WORKLOG_LIMIT`.
#[must_use]
pub fn clamp_limit(limit: Option<i64>) -> u32 {
    let limit = limit.unwrap_or(i64::from(DEFAULT_WORKLOG_LIMIT));
    let clamped = limit.clamp(1, i64::from(MAX_WORKLOG_LIMIT));
    u32::try_from(clamped).unwrap_or(DEFAULT_WORKLOG_LIMIT)
}
