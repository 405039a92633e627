use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Expands a path starting with `~` to the user's home directory.
///
/// # Errors
///
/// Returns an error if the path is empty or the home directory cannot be
/// determined for a tilde path.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    if path.is_empty() {
        anyhow::bail!("Path cannot be empty");
    }
    if path == "~" {
        return dirs::home_dir().context("Could not find home directory");
    }
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir().context("Could not find home directory")?;
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(path))
}

/// Makes a path absolute, resolving relative paths from the current directory.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined.
pub fn make_absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir()?;
        Ok(current_dir.join(path))
    }
}

/// Lexically normalizes a path, removing `.` components and resolving `..`
/// against preceding components.
///
/// Unlike `Path::canonicalize` this does not touch the filesystem, so it
/// also works for paths that do not exist yet (or no longer exist).
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            _ => normalized.push(component.as_os_str()),
        }
    }
    normalized
}

/// Expands and normalizes a user-supplied path into canonical absolute form.
///
/// All registry identity comparisons and manifest keys use this form.
///
/// # Errors
///
/// Returns an error if the path is empty or cannot be absolutized.
pub fn expand_user_path(path: &str) -> Result<PathBuf> {
    let expanded = expand_tilde(path)?;
    Ok(normalize(&make_absolute(&expanded)?))
}

/// Strips the filesystem root from an absolute path, yielding the path
/// relative to a repository root that mirrors the whole filesystem.
#[must_use]
pub fn strip_root(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}

/// Ensures parent directories exist for a given path.
///
/// # Errors
///
/// Returns an error if the parent directories cannot be created.
pub fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create parent directories for {}", path.display())
        })?;
    }
    Ok(())
}
