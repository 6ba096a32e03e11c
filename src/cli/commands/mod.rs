//! Command implementations.

pub mod completions;
pub mod status;
pub mod sync;
pub mod version;
pub mod worklogs;
