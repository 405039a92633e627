use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::debug;

use crate::errors::RegistryError;

/// Fixed author email applied to every commit made by cir.
const AUTHOR_EMAIL: &str = "cir-auto-commit@nowhere.cz";

/// Author name used when neither the config nor `$USER` provides one.
const AUTHOR_FALLBACK: &str = "cir-auto-commit";

/// Narrow capability wrapper over the `git` binary.
///
/// The repository's object model stays behind this interface: callers only
/// ever stage paths, unstage paths, and commit, against a linear
/// single-parent history rooted at `root`. All invocations shell out to
/// `git`, the same way dotfile managers drive their mirror repositories.
#[derive(Debug)]
pub struct GitStore {
    /// Working directory of the repository (parent of `.git`).
    root: PathBuf,
    /// Author name override from the configuration, if any.
    author_name: Option<String>,
}

impl GitStore {
    /// Creates a new repository at `root`.
    ///
    /// With a `remote` the repository is cloned from it; otherwise an empty
    /// repository is initialized. The clone may be long-running; backend
    /// errors are surfaced, never retried.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::RepositoryExists`] if `root` already
    /// exists, and propagates git/IO failures otherwise.
    pub fn create(root: &Path, remote: Option<&str>) -> Result<Self> {
        ensure_git_available()?;

        if root.exists() {
            return Err(RegistryError::RepositoryExists(root.to_path_buf()).into());
        }

        if let Some(parent) = root.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create parent directories for {}", root.display())
            })?;
        }

        if let Some(url) = remote {
            debug!(url, root = %root.display(), "Cloning repository");
            let output = Command::new("git")
                .args(["clone", url])
                .arg(root)
                .stdin(Stdio::null())
                .output()
                .context("Failed to run git clone")?;
            check_status("git clone", &output)?;
        } else {
            std::fs::create_dir_all(root)
                .with_context(|| format!("Failed to create directory: {}", root.display()))?;
            let store = Self {
                root: root.to_path_buf(),
                author_name: None,
            };
            store.run_git(&["init"])?;
            return Ok(store);
        }

        Ok(Self {
            root: root.to_path_buf(),
            author_name: None,
        })
    }

    /// Opens an existing repository at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` does not hold a git repository.
    pub fn open(root: &Path) -> Result<Self> {
        ensure_git_available()?;

        let git_dir = root.join(".git");
        if !git_dir.exists() {
            return Err(anyhow::anyhow!(
                "No git repository found at {}",
                root.display()
            ));
        }

        Ok(Self {
            root: root.to_path_buf(),
            author_name: None,
        })
    }

    /// Sets the commit author name, overriding the `$USER` fallback chain.
    pub fn set_author(&mut self, name: Option<String>) {
        self.author_name = name;
    }

    /// Absolute path of the repository working directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Adds the current on-disk content at `relative_path` to the pending
    /// change set. Repeated calls on the same path before a commit are
    /// idempotent.
    ///
    /// # Errors
    ///
    /// Propagates git failures.
    pub fn stage(&self, relative_path: &Path) -> Result<()> {
        self.run_git(&["add", "--", path_arg(relative_path)?])?;
        Ok(())
    }

    /// Marks `relative_path` for removal in the pending change set without
    /// touching the working tree.
    ///
    /// # Errors
    ///
    /// Propagates git failures.
    pub fn unstage(&self, relative_path: &Path) -> Result<()> {
        self.run_git(&["rm", "--cached", "--", path_arg(relative_path)?])?;
        Ok(())
    }

    /// Distinct paths staged since the last commit.
    ///
    /// # Errors
    ///
    /// Propagates git failures.
    pub fn staged_paths(&self) -> Result<Vec<String>> {
        let output = self.run_git(&["diff", "--cached", "--name-only"])?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(ToString::to_string)
            .collect())
    }

    /// Writes all staged changes as one new revision and clears the pending
    /// change set. Returns the new commit id, or `None` when nothing was
    /// staged (an empty batch never produces an empty commit).
    ///
    /// Without `message` one is synthesized listing the staged paths. The
    /// commit author falls back from the configured name to `$USER` to a
    /// fixed identity.
    ///
    /// # Errors
    ///
    /// Propagates git failures.
    pub fn commit(&self, message: Option<&str>) -> Result<Option<String>> {
        let staged = self.staged_paths()?;
        if staged.is_empty() {
            debug!("Nothing staged, skipping commit");
            return Ok(None);
        }

        let message = message.map_or_else(
            || format!("Affected files: {}", staged.join(", ")),
            ToString::to_string,
        );

        let author = self.author_name.clone().unwrap_or_else(|| {
            std::env::var("USER").unwrap_or_else(|_| AUTHOR_FALLBACK.to_string())
        });
        let name_flag = format!("user.name={author}");
        let email_flag = format!("user.email={AUTHOR_EMAIL}");

        self.run_git(&["-c", &name_flag, "-c", &email_flag, "commit", "-m", &message])?;

        let output = self.run_git(&["rev-parse", "HEAD"])?;
        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(commit = %id, files = staged.len(), "Committed staged changes");
        Ok(Some(id))
    }

    /// Runs a git subcommand inside the repository, failing on non-zero exit.
    fn run_git(&self, args: &[&str]) -> Result<Output> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to run git {}", args.join(" ")))?;

        let subcommand = args
            .iter()
            .find(|a| !a.starts_with('-') && !a.contains('='))
            .copied()
            .unwrap_or("");
        check_status(&format!("git {subcommand}"), &output)?;
        Ok(output)
    }
}

/// Converts a relative path into a command-line argument.
fn path_arg(path: &Path) -> Result<&str> {
    path.to_str()
        .with_context(|| format!("Path is not valid UTF-8: {}", path.display()))
}

/// Fails with a digested stderr message when a git command exited non-zero.
fn check_status(command: &str, output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(anyhow::anyhow!(
        "{} failed: {}",
        command,
        digest_stderr(&stderr)
    ))
}

/// Extracts the meaningful part of git's stderr, dropping noise lines.
fn digest_stderr(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(3)
        .collect();

    if lines.is_empty() {
        return "no error details available".to_string();
    }
    lines.join(" | ")
}

/// Checks that a `git` binary is reachable on `$PATH`.
fn ensure_git_available() -> Result<()> {
    which::which("git")
        .map(|_| ())
        .context("The 'git' binary was not found on PATH; cir requires git to manage its repository")
}
