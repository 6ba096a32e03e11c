//! Remote issue-tracker access.
//!
//! The sync engine only needs one capability from the remote: an
//! authenticated `GET` that returns a JSON body or fails with the HTTP
//! status and response text. [`RemoteApi`] is that seam; [`JiraClient`] is
//! the production implementation.
//!
//! # Submodules
//!
//! - [`client`] - reqwest-based Jira Cloud client
//! - [`types`] - Raw payload shapes as returned by the remote

pub mod client;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use client::JiraClient;
pub use types::{
    RemoteIssue, RemoteIssueFields, RemoteIssueLink, RemoteLinkType, RemoteNamed, RemoteProject,
    RemoteRef, RemoteUser, RemoteVisibility, RemoteWorklog,
};

use crate::error::Result;

/// Authenticated, paginated-request capability against the remote API.
///
/// Implementations must turn any non-success status into
/// [`crate::Error::Fetch`] carrying the status code and the response body.
/// No retry or backoff is expected at this layer.
pub trait RemoteApi: Send + Sync {
    /// `GET path?query` and decode the body as JSON.
    fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> impl std::future::Future<Output = Result<serde_json::Value>> + Send;
}
