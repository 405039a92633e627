use anyhow::Result;
use cir::diff::DiffOptions;
use cir::registry::{CreateOptions, Registry};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Test repository fixture for consistent test setup.
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub registry: Registry,
}

impl TestRepo {
    /// Create a fresh repository under a temporary directory.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let repo_path = temp_dir.path().join(".cir/repository");

        let registry = Registry::create(&repo_path, &CreateOptions::default())?
            .with_diff_options(DiffOptions {
                context_lines: 3,
                color: false,
            });

        Ok(Self { temp_dir, registry })
    }
}

/// Count commits in a git working directory, zero when there is no history.
pub fn commit_count(root: &Path) -> usize {
    let output = Command::new("git")
        .args(["rev-list", "--count", "HEAD"])
        .current_dir(root)
        .output()
        .expect("failed to run git rev-list");

    if !output.status.success() {
        return 0;
    }
    String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse()
        .unwrap_or(0)
}

/// Subject line of the latest commit.
pub fn last_commit_subject(root: &Path) -> String {
    let output = Command::new("git")
        .args(["log", "-1", "--format=%s"])
        .current_dir(root)
        .output()
        .expect("failed to run git log");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Render a path as the string argument the registry API takes.
pub fn arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
