//! Remote-to-local sync.
//!
//! Pulls projects, issues, issue links and worklogs from the remote tracker
//! and mirrors them into the local store:
//!
//! - **Fetch**: walk paginated listings until each listing's stop rule fires
//! - **Map**: turn raw payloads into canonical records (pure functions)
//! - **Write**: upsert each batch in one transaction
//!
//! # Example
//!
//! ```ignore
//! use jsync::sync::{SyncEngine, SyncKind};
//!
//! let mut engine = SyncEngine::new(&mut storage, &client);
//! let summary = runtime.block_on(engine.run(SyncKind::All))?;
//! println!("{} records", summary.total());
//! ```

pub mod adf;
mod engine;
pub mod fetch;
pub mod mapper;
mod types;

pub use adf::flatten_document;
pub use engine::{SyncEngine, get_worklogs};
pub use fetch::{Listing, Paginator};
pub use mapper::{MappedIssue, derive_links, map_issue, map_project, map_worklog};
pub use types::{
    DEFAULT_WORKLOG_LIMIT, IssueSelector, MAX_WORKLOG_LIMIT, SyncKind, SyncSummary, WorklogQuery,
    clamp_limit,
};
