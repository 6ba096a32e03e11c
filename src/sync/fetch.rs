//! Paginated fetching from the remote.
//!
//! A [`Paginator`] walks one listing from offset 0 until the listing's own
//! termination rule fires:
//!
//! | Listing   | Stops when                                             |
//! |-----------|--------------------------------------------------------|
//! | projects  | the page says `isLast`, or the page is empty           |
//! | issues    | the page is shorter than the requested page size       |
//! | worklogs  | the page is short, or the running total reaches `total`|
//!
//! Offsets advance by the number of items actually received. Any failed
//! request ends the walk with that error; there is no retry.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::remote::RemoteApi;

/// Default page size for the project listing.
pub const PROJECT_PAGE_SIZE: usize = 50;

/// Default page size for issue search (the remote's maximum).
pub const ISSUE_PAGE_SIZE: usize = 100;

/// Default page size for per-issue worklogs.
pub const WORKLOG_PAGE_SIZE: usize = 100;

/// Fields projected for a full issue sync.
pub const ISSUE_FIELDS: &[&str] = &[
    "summary",
    "status",
    "issuetype",
    "project",
    "created",
    "updated",
    "issuelinks",
];

/// Fields projected when only relationships are needed.
pub const LINK_FIELDS: &[&str] = &["issuelinks"];

/// Field projection that returns ids and keys only.
const NO_FIELDS: &str = "*none";

/// Issue search ordering; a stable order keeps offsets meaningful.
const ISSUE_JQL: &str = "order by id asc";

/// A paginated listing on the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// `GET /rest/api/3/project/search`
    Projects,
    /// `GET /rest/api/3/search` with a field projection
    Issues { fields: String },
    /// `GET /rest/api/3/issue/{issue_id}/worklog`
    Worklogs { issue_id: String },
}

impl Listing {
    /// Issue search with the given projected fields.
    #[must_use]
    pub fn issues(fields: &[&str]) -> Self {
        Self::Issues {
            fields: fields.join(","),
        }
    }

    /// Issue search returning identifiers only.
    #[must_use]
    pub fn issue_ids() -> Self {
        Self::Issues {
            fields: NO_FIELDS.to_string(),
        }
    }

    /// Request path for this listing.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Projects => "/rest/api/3/project/search".to_string(),
            Self::Issues { .. } => "/rest/api/3/search".to_string(),
            Self::Worklogs { issue_id } => format!("/rest/api/3/issue/{issue_id}/worklog"),
        }
    }

    fn query(&self, start_at: usize, max_results: usize) -> Vec<(&'static str, String)> {
        let mut query = Vec::with_capacity(4);
        if let Self::Issues { .. } = self {
            query.push(("jql", ISSUE_JQL.to_string()));
        }
        query.push(("startAt", start_at.to_string()));
        query.push(("maxResults", max_results.to_string()));
        if let Self::Issues { fields } = self {
            query.push(("fields", fields.clone()));
        }
        query
    }

    fn default_page_size(&self) -> usize {
        match self {
            Self::Projects => PROJECT_PAGE_SIZE,
            Self::Issues { .. } => ISSUE_PAGE_SIZE,
            Self::Worklogs { .. } => WORKLOG_PAGE_SIZE,
        }
    }

    /// Split a response body into its items and paging hints.
    fn parse_page(&self, mut body: Value) -> Page {
        let take_array = |body: &mut Value, key: &str| match body.get_mut(key).map(Value::take) {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        };

        match self {
            Self::Projects => Page {
                is_last: body.get("isLast").and_then(Value::as_bool).unwrap_or(false),
                total: None,
                items: take_array(&mut body, "values").unwrap_or_default(),
            },
            Self::Issues { .. } => Page {
                is_last: false,
                total: None,
                items: take_array(&mut body, "issues").unwrap_or_default(),
            },
            Self::Worklogs { .. } => Page {
                is_last: false,
                total: body.get("total").and_then(as_count),
                items: take_array(&mut body, "worklogs")
                    .or_else(|| take_array(&mut body, "values"))
                    .unwrap_or_default(),
            },
        }
    }
}

/// Read a numeric `total`; non-numbers are ignored.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_count(value: &Value) -> Option<usize> {
    value
        .as_u64()
        .map(|n| n as usize)
        .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f as usize))
}

struct Page {
    items: Vec<Value>,
    is_last: bool,
    total: Option<usize>,
}

/// Lazy, finite, non-restartable walk over one remote listing.
///
/// Each call to [`Paginator::next_page`] issues at most one request. Once
/// the listing is exhausted every further call returns `Ok(None)` without
/// touching the remote.
pub struct Paginator<'a, R> {
    remote: &'a R,
    listing: Listing,
    page_size: usize,
    start_at: usize,
    received: usize,
    requests: usize,
    exhausted: bool,
}

impl<'a, R: RemoteApi> Paginator<'a, R> {
    /// Create a paginator using the listing's default page size.
    #[must_use]
    pub fn new(remote: &'a R, listing: Listing) -> Self {
        let page_size = listing.default_page_size();
        Self {
            remote,
            listing,
            page_size,
            start_at: 0,
            received: 0,
            requests: 0,
            exhausted: false,
        }
    }

    /// Paginator over all projects.
    #[must_use]
    pub fn projects(remote: &'a R) -> Self {
        Self::new(remote, Listing::Projects)
    }

    /// Paginator over all issues with the given projected fields.
    #[must_use]
    pub fn issues(remote: &'a R, fields: &[&str]) -> Self {
        Self::new(remote, Listing::issues(fields))
    }

    /// Paginator over issue ids and keys only.
    #[must_use]
    pub fn issue_ids(remote: &'a R) -> Self {
        Self::new(remote, Listing::issue_ids())
    }

    /// Paginator over one issue's worklogs.
    #[must_use]
    pub fn worklogs(remote: &'a R, issue_id: &str) -> Self {
        Self::new(
            remote,
            Listing::Worklogs {
                issue_id: issue_id.to_string(),
            },
        )
    }

    /// Override the requested page size (minimum 1).
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Number of page requests issued so far.
    #[must_use]
    pub fn requests(&self) -> usize {
        self.requests
    }

    /// Number of items received so far.
    #[must_use]
    pub fn received(&self) -> usize {
        self.received
    }

    /// Whether the listing has been fully read.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Fetch the next page of raw records.
    ///
    /// Returns `Ok(None)` once the listing is exhausted. An empty page ends
    /// the listing and is reported as `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns the remote's error for a failed request. The paginator is
    /// exhausted afterwards.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Value>>> {
        if self.exhausted {
            return Ok(None);
        }

        let path = self.listing.path();
        let query = self.listing.query(self.start_at, self.page_size);

        self.requests += 1;
        let body = match self.remote.get_json(&path, &query).await {
            Ok(body) => body,
            Err(e) => {
                self.exhausted = true;
                return Err(e);
            }
        };

        let page = self.listing.parse_page(body);
        let count = page.items.len();
        self.received += count;
        self.start_at += count;

        self.exhausted = match self.listing {
            Listing::Projects => page.is_last || count == 0,
            Listing::Issues { .. } => count < self.page_size,
            Listing::Worklogs { .. } => {
                count < self.page_size || page.total.is_some_and(|t| self.received >= t)
            }
        };

        debug!(
            path = %path,
            start_at = self.start_at - count,
            received = count,
            last = self.exhausted,
            "Fetched page"
        );

        if count == 0 {
            return Ok(None);
        }

        Ok(Some(page.items))
    }

    /// Drain the remaining pages as raw records.
    ///
    /// # Errors
    ///
    /// Returns the first failed request's error.
    pub async fn collect_raw(&mut self) -> Result<Vec<Value>> {
        let mut all = Vec::new();
        while let Some(items) = self.next_page().await? {
            all.extend(items);
        }
        Ok(all)
    }

    /// Drain the remaining pages and decode every record as `T`.
    ///
    /// # Errors
    ///
    /// Returns the first failed request's error, or a JSON error for a
    /// record that does not decode.
    pub async fn collect_all<T: DeserializeOwned>(&mut self) -> Result<Vec<T>> {
        let mut all = Vec::new();
        while let Some(items) = self.next_page().await? {
            for item in items {
                all.push(serde_json::from_value(item)?);
            }
        }
        Ok(all)
    }
}
