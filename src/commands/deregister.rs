use anyhow::Result;

use crate::CirContext;

/// Stops tracking the given files and drops their stored copies.
///
/// # Errors
///
/// Fails fast on the first path that is not registered.
pub fn execute(ctx: &CirContext, files: &[String], message: Option<&str>) -> Result<()> {
    let mut registry = super::open_registry(ctx)?;
    let deregistered = registry.deregister(files, message)?;

    for file in &deregistered {
        println!("Deregistering file: {}", file.display());
    }
    super::print_success(&format!("Deregistered {} file(s)", deregistered.len()));
    Ok(())
}
