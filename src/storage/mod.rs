//! SQLite storage layer for the mirror.
//!
//! This module provides the persistence layer using SQLite with:
//! - WAL mode for concurrent reads
//! - One transaction per upsert batch
//! - Idempotent schema bootstrap
//!
//! # Submodules
//!
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - Main SQLite storage implementation

pub mod schema;
pub mod sqlite;

pub use sqlite::{MirrorCounts, SqliteStorage};
