#![warn(missing_docs)]

//! # Cir - Configs In Repository
//!
//! Cir keeps configuration files that live all over a filesystem safely
//! versioned inside one private git repository. Files are registered under
//! their absolute path, mirrored into the repository, and can later be
//! diffed, updated (commit the live edits) or restored (revert the live
//! file to its last known good state).
//!
//! ## Architecture
//!
//! - [`registry`]: The orchestrator implementing register / deregister /
//!   status / update / restore against one or many tracked paths
//! - [`git`]: Narrow wrapper over the `git` binary (init, clone, stage,
//!   unstage, commit)
//! - [`manifest`]: The transactional tracked-file document stored at the
//!   repository root
//! - [`diff`]: Unified diff generation between stored copies and live files
//! - [`tracked`]: The tracked-file value type handed out by status queries
//! - [`commands`]: CLI command implementations
//! - [`config`]: Configuration parsing and persistence
//!
//! ## Example Usage
//!
//! ```no_run
//! use cir::registry::{CreateOptions, Registry};
//!
//! # fn main() -> anyhow::Result<()> {
//! Registry::create("/home/user/.cir/repository".as_ref(), &CreateOptions::default())?;
//!
//! let mut registry = Registry::open("/home/user/.cir/repository".as_ref())?;
//! registry.register(&["~/.bashrc".into()], None)?;
//!
//! for file in registry.status(&[])? {
//!     if file.diff(registry.diff_options())?.changed() {
//!         println!("{} diverged", file.file_path.display());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Commands module containing all CLI command implementations.
pub mod commands;

/// Configuration parsing and persistence.
pub mod config;

/// Diff generation between stored copies and live files.
pub mod diff;

/// Domain error types surfaced by registry operations.
pub mod errors;

/// Git backend wrapper (init, clone, stage, unstage, commit).
pub mod git;

/// Tracked-file manifest persistence and transactions.
pub mod manifest;

/// Path expansion and normalization helpers.
pub mod paths;

/// The tracked-file registry orchestrating git, manifest and diffs.
pub mod registry;

/// Tracked-file value type pairing live path with stored copy.
pub mod tracked;

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Current version of the cir binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default repository directory relative to the home directory.
pub const DEFAULT_REPO_DIR: &str = ".cir/repository";

/// Default configuration file path relative to the home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/cir/config";

/// Name of the tracked-file manifest at the repository root.
pub const MANIFEST_FILE: &str = "cir.files.toml";

/// Central context for all cir commands.
///
/// Holds the repository location and loaded configuration. Constructed once
/// in `main` and passed down explicitly; there is no process-wide state.
#[derive(Debug, Clone)]
pub struct CirContext {
    /// Path to the cir repository directory.
    pub repo_path: PathBuf,

    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,
}

impl CirContext {
    /// Creates a new context by loading the configuration from the default
    /// path, honoring the `CIR_CONFIG_PATH` and `CIR_HOME` environment
    /// overrides.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined or the
    /// configuration file cannot be read or created.
    pub fn new() -> Result<Self> {
        let config_path = if let Ok(path) = std::env::var("CIR_CONFIG_PATH") {
            PathBuf::from(path)
        } else {
            let home = dirs::home_dir().context("Could not find home directory")?;
            home.join(DEFAULT_CONFIG_PATH)
        };

        let config = config::Config::load(&config_path)?;

        let repo_path = if let Ok(path) = std::env::var("CIR_HOME") {
            PathBuf::from(path)
        } else {
            config.core.repo_path.clone()
        };

        Ok(Self {
            repo_path,
            config_path,
            config,
        })
    }

    /// Creates a context with explicit paths, avoiding environment variable
    /// manipulation in tests.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be loaded or created.
    pub fn new_explicit(repo_path: PathBuf, config_path: PathBuf) -> Result<Self> {
        let config = if config_path.exists() {
            config::Config::load(&config_path)?
        } else {
            let mut config = config::Config::default();
            config.core.repo_path.clone_from(&repo_path);

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            config.save(&config_path)?;
            config
        };

        Ok(Self {
            repo_path,
            config_path,
            config,
        })
    }

    /// Checks whether the repository has been initialized.
    #[must_use]
    pub fn is_repo_initialized(&self) -> bool {
        self.repo_path.join(".git").exists() && self.repo_path.join(MANIFEST_FILE).exists()
    }

    /// Checks that the repository is initialized, returning an error if not.
    ///
    /// # Errors
    /// Returns an error if the repository is not initialized.
    pub fn check_repo_initialized(&self) -> Result<()> {
        if !self.is_repo_initialized() {
            return Err(anyhow::anyhow!(
                "Repository not initialized: no cir repository found in {}. Did you run 'cir init'?",
                self.repo_path.display()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_explicit_writes_default_config() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let repo_path = dir.path().join("repository");
        let config_path = dir.path().join("config");

        let ctx = CirContext::new_explicit(repo_path.clone(), config_path.clone())?;
        assert!(config_path.exists());
        assert_eq!(ctx.config.core.repo_path, repo_path);
        assert!(!ctx.is_repo_initialized());
        assert!(ctx.check_repo_initialized().is_err());
        Ok(())
    }

    #[test]
    fn test_repo_initialized_requires_git_and_manifest() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let repo_path = dir.path().join("repository");
        let ctx =
            CirContext::new_explicit(repo_path.clone(), dir.path().join("config"))?;

        std::fs::create_dir_all(repo_path.join(".git"))?;
        assert!(!ctx.is_repo_initialized());

        std::fs::write(repo_path.join(MANIFEST_FILE), "version = 1\n")?;
        assert!(ctx.is_repo_initialized());
        Ok(())
    }
}
