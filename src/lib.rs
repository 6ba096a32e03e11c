//! jsync - mirror a Jira Cloud site into SQLite
//!
//! This crate provides the core functionality for the `jsync` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Canonical records (Project, Issue, IssueLink, Worklog)
//! - [`remote`] - Remote API seam and the reqwest client
//! - [`storage`] - SQLite mirror with batched upserts
//! - [`sync`] - Pagination, mapping and sync orchestration
//! - [`config`] - Database and remote target resolution
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod remote;
pub mod storage;
pub mod sync;

pub use error::{Error, Result};
