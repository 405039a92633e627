use anyhow::Result;

use crate::CirContext;
use crate::registry::RestoreAction;

/// Restores live files from their stored copies.
///
/// Without an explicit file list and without `--force`, files with local
/// edits are skipped and reported rather than overwritten.
///
/// # Errors
///
/// Fails on the first requested path that is not registered.
pub fn execute(ctx: &CirContext, files: &[String], force: bool) -> Result<()> {
    let registry = super::open_registry(ctx)?;

    let outcomes = registry.restore(files, force)?;
    let mut restored_count = 0;

    for outcome in &outcomes {
        match outcome.action {
            RestoreAction::Restored => {
                restored_count += 1;
                println!("Restoring {}", outcome.path.display());
            }
            RestoreAction::Skipped => {
                super::print_warning(&format!(
                    "Skipped mass change to {} (use --force or name the file explicitly)",
                    outcome.path.display()
                ));
            }
            RestoreAction::InSync => {}
        }
    }

    if restored_count == 0 {
        super::print_info("Nothing to restore");
    } else {
        super::print_success(&format!("Restored {restored_count} file(s)"));
    }
    Ok(())
}
