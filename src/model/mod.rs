//! Canonical records mirrored into the store.
//!
//! These are the normalized, store-ready forms of remote entities:
//! - Project
//! - Issue
//! - IssueLink (a directed edge between two issues)
//! - Worklog
//!
//! All identifiers are strings regardless of how the remote typed them.
//! Timestamps are Unix milliseconds.

pub mod issue;
pub mod project;
pub mod worklog;

pub use issue::{Issue, IssueLink};
pub use project::Project;
pub use worklog::Worklog;
