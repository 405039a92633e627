//! CLI command implementations.
//!
//! Each submodule is a thin layer over [`crate::registry::Registry`]: it
//! opens the registry from the context, runs one registry verb, and prints
//! the outcome. Domain errors propagate to `main`, which reports them and
//! exits non-zero.

/// Deregister command
pub mod deregister;
/// Init command
pub mod init;
/// Register command
pub mod register;
/// Restore command
pub mod restore;
/// Status command
pub mod status;
/// Update command
pub mod update;

use anyhow::Result;
use colored::Colorize;

use crate::CirContext;
use crate::registry::Registry;

/// Prints a success message with a green check mark.
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an informational message with a blue marker.
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Prints a warning message with a yellow marker.
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Opens the registry for commands that require an initialized repository,
/// applying the configured diff options and commit author.
fn open_registry(ctx: &CirContext) -> Result<Registry> {
    ctx.check_repo_initialized()?;
    let mut registry =
        Registry::open(&ctx.repo_path)?.with_diff_options(ctx.config.diff_options());
    registry.set_author(ctx.config.user.name.clone());
    Ok(registry)
}
