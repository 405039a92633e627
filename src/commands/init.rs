use anyhow::Result;

use crate::CirContext;
use crate::registry::{CreateOptions, Registry};

/// Initializes all internal structures in the repository home, optionally
/// cloning an existing repository.
///
/// # Errors
///
/// Fails if the repository path already exists or creation fails.
pub fn execute(ctx: &CirContext, clone: Option<&str>) -> Result<()> {
    let options = CreateOptions {
        remote: clone.map(ToString::to_string),
    };
    Registry::create(&ctx.repo_path, &options)?;

    super::print_success(&format!(
        "Initialized cir repository in {}",
        ctx.repo_path.display()
    ));
    Ok(())
}
