use anyhow::Result;

use crate::CirContext;

/// Starts tracking the given files.
///
/// # Errors
///
/// Fails fast on the first already-registered path.
pub fn execute(ctx: &CirContext, files: &[String], message: Option<&str>) -> Result<()> {
    let mut registry = super::open_registry(ctx)?;
    let registered = registry.register(files, message)?;

    for file in &registered {
        println!("Registering file: {}", file.display());
    }
    super::print_success(&format!("Registered {} file(s)", registered.len()));
    Ok(())
}
