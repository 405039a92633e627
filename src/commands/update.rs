use anyhow::Result;

use crate::CirContext;

/// Updates stored copies of changed files with their live content.
///
/// # Errors
///
/// Fails on the first requested path that is not registered.
pub fn execute(ctx: &CirContext, files: &[String], message: Option<&str>) -> Result<()> {
    let registry = super::open_registry(ctx)?;

    let updated = registry.update(files, message)?;
    if updated.is_empty() {
        super::print_info("Nothing to update, stored copies are current");
        return Ok(());
    }

    for path in &updated {
        println!("Updating {}", path.display());
    }
    super::print_success(&format!("Updated {} file(s)", updated.len()));
    Ok(())
}
