use anyhow::Result;

use crate::CirContext;

/// Shows the state of registered files, optionally with rendered diffs.
///
/// # Errors
///
/// Fails on the first requested path that is not registered.
pub fn execute(ctx: &CirContext, files: &[String], show_diff: bool, all: bool) -> Result<()> {
    let registry = super::open_registry(ctx)?;

    let tracked = registry.status(files)?;
    if tracked.is_empty() {
        super::print_info("No files registered");
        return Ok(());
    }

    let mut changed_count = 0;

    for file in tracked {
        let diff = file.diff(registry.diff_options())?;
        if diff.changed() {
            changed_count += 1;
            println!("File {} changed.", file.file_path.display());
            if show_diff {
                println!("{}", diff.render());
            }
        } else if all {
            println!("File {} is the same.", file.file_path.display());
        }
    }

    if changed_count == 0 && !all {
        super::print_info("All registered files are in sync");
    }
    Ok(())
}
