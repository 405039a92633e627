//! Command-line interface definitions for cir.
//!
//! All argument parsing structures live here, built with clap's derive
//! macros. Field-level documentation is provided through clap attributes,
//! so missing_docs is allowed for this module.

#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Main CLI structure for cir.
#[derive(Parser)]
#[command(
    name = "cir",
    version = crate::VERSION,
    about = "Configs In Repository",
    long_about = "Keep configuration files from all over the filesystem safely versioned in one git repository"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the repository in $CIR_HOME
    Init {
        /// Optional URL of a repository that should be cloned
        #[arg(long)]
        clone: Option<String>,
    },

    /// Start tracking new file(s)
    Register {
        /// Files to register
        #[arg(required = true)]
        files: Vec<String>,

        /// Commit message recorded in the tracking repository
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Stop tracking file(s) and drop their stored copies
    Deregister {
        /// Files to deregister
        #[arg(required = true)]
        files: Vec<String>,

        /// Commit message recorded in the tracking repository
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Show status of registered files
    Status {
        /// Limit output to the given files (default: all registered)
        files: Vec<String>,

        /// Show diffs for changed files
        #[arg(short = 'd', long = "diff")]
        show_diff: bool,

        /// Also list files that have not changed
        #[arg(short, long)]
        all: bool,
    },

    /// Update stored copies of changed files with their live content
    Update {
        /// Files to update (default: all registered)
        files: Vec<String>,

        /// Commit message recorded in the tracking repository
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Discard local changes and restore the last known version
    Restore {
        /// Files to restore (default: all registered)
        files: Vec<String>,

        /// Overwrite changed files even in an unscoped restore
        #[arg(short, long)]
        force: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
