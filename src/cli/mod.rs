//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::DB_ENV;
use crate::sync::SyncKind;

/// Output format for command results.
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// JSON (same as --json)
    Json,
}

pub mod commands;

/// jsync - mirror a Jira Cloud site into a local SQLite database
#[derive(Parser, Debug)]
#[command(name = "jsync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (no default; also read from config.json)
    #[arg(long, global = true, env = DB_ENV)]
    pub db: Option<PathBuf>,

    /// Output as JSON (for scripts and agents)
    #[arg(long, global = true)]
    pub json: bool,

    /// Output format (text, json)
    #[arg(long, value_enum, global = true, default_value_t)]
    pub format: OutputFormat,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pull data from the remote into the local mirror
    Sync {
        #[command(subcommand)]
        command: SyncCommands,
    },

    /// List mirrored worklogs of one issue
    Worklogs(WorklogsArgs),

    /// Show row counts of the local mirror
    Status,

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ============================================================================
// Sync Commands
// ============================================================================

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncCommands {
    /// Mirror all projects
    Projects,

    /// Mirror all issues
    Issues,

    /// Mirror issue links
    Relations,

    /// Mirror every issue's worklogs
    Worklogs,

    /// Projects, issues, links and worklogs in one pass
    All,
}

impl From<SyncCommands> for SyncKind {
    fn from(command: SyncCommands) -> Self {
        match command {
            SyncCommands::Projects => Self::Projects,
            SyncCommands::Issues => Self::Issues,
            SyncCommands::Relations => Self::Relations,
            SyncCommands::Worklogs => Self::Worklogs,
            SyncCommands::All => Self::All,
        }
    }
}

// ============================================================================
// Worklog Query
// ============================================================================

#[derive(Args, Debug)]
pub struct WorklogsArgs {
    /// Remote issue id
    #[arg(long)]
    pub issue_id: Option<String>,

    /// Issue key (e.g. OPS-12); used when both are given
    #[arg(long)]
    pub issue_key: Option<String>,

    /// Maximum rows (default 50, clamped to 1..=500)
    #[arg(long, short = 'n', allow_negative_numbers = true)]
    pub limit: Option<i64>,
}
