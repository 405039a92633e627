use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::MANIFEST_FILE;
use crate::diff::DiffOptions;
use crate::errors::RegistryError;
use crate::git::GitStore;
use crate::manifest::{FileEntry, Manifest, ManifestStore};
use crate::paths::{ensure_parent_dirs, expand_user_path, strip_root};
use crate::tracked::TrackedFile;

/// Options for repository creation.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Optional remote URL to clone from instead of initializing empty.
    pub remote: Option<String>,
}

/// What `restore` did, or chose not to do, for one tracked path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreAction {
    /// The live file was overwritten (or recreated) from the stored copy.
    Restored,
    /// The live file already matched the stored copy.
    InSync,
    /// The live file had local edits and the unscoped, unforced restore
    /// left them alone.
    Skipped,
}

/// Per-path outcome of a restore batch.
#[derive(Debug, Clone)]
pub struct RestoreOutcome {
    /// Canonical absolute path of the live file.
    pub path: PathBuf,
    /// What happened to it.
    pub action: RestoreAction,
}

/// The tracked-file registry.
///
/// Composes the git backend, the manifest document and the diff engine to
/// implement register / deregister / status / update / restore against one
/// or many paths. Batch operations are fail-fast and issue at most one
/// commit per invocation; `restore` only ever mutates the live filesystem.
///
/// Instances are constructed explicitly and passed around; there is no
/// process-wide repository handle.
#[derive(Debug)]
pub struct Registry {
    git: GitStore,
    manifest: ManifestStore,
    diff_options: DiffOptions,
}

impl Registry {
    /// Creates a new repository at `root` and returns an opened registry.
    ///
    /// With a remote the repository is cloned from it; a manifest already
    /// present in the clone is adopted, otherwise a fresh one is created,
    /// staged, and committed.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::RepositoryExists`] if `root` exists, and
    /// propagates backend failures.
    pub fn create(root: &Path, options: &CreateOptions) -> Result<Self> {
        let git = GitStore::create(root, options.remote.as_deref())?;

        let manifest = if git.root().join(MANIFEST_FILE).exists() {
            ManifestStore::open(git.root())?
        } else {
            let manifest = ManifestStore::initialize(git.root())?;
            git.stage(Path::new(MANIFEST_FILE))?;
            git.commit(None)?;
            manifest
        };

        info!(root = %root.display(), "Repository created");
        Ok(Self {
            git,
            manifest,
            diff_options: DiffOptions::default(),
        })
    }

    /// Opens an existing repository at `root`.
    ///
    /// # Errors
    ///
    /// Fails if `root` does not hold a repository with a manifest.
    pub fn open(root: &Path) -> Result<Self> {
        let git = GitStore::open(root)?;
        let manifest = ManifestStore::open(git.root())?;
        Ok(Self {
            git,
            manifest,
            diff_options: DiffOptions::default(),
        })
    }

    /// Replaces the diff rendering options (defaults: 3 context lines,
    /// color on).
    #[must_use]
    pub fn with_diff_options(mut self, options: DiffOptions) -> Self {
        self.diff_options = options;
        self
    }

    /// Sets the commit author name recorded in the repository.
    pub fn set_author(&mut self, name: Option<String>) {
        self.git.set_author(name);
    }

    /// The diff options handed to tracked files.
    #[must_use]
    pub fn diff_options(&self) -> &DiffOptions {
        &self.diff_options
    }

    /// Absolute path of the repository working directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.git.root()
    }

    /// Registers new files. Each path must be absolute after expansion and
    /// not yet tracked.
    ///
    /// For every accepted path the live content is copied into the
    /// repository, staged, and recorded in the manifest; the whole batch is
    /// committed once, with `message` taking precedence over the
    /// synthesized one. Returns the canonical paths that were registered,
    /// in input order.
    ///
    /// # Errors
    ///
    /// Fails fast with [`RegistryError::AlreadyRegistered`] on the first
    /// tracked path. An aborted batch leaves no trace: the manifest is
    /// rolled back and the imports of earlier paths in the batch are
    /// unstaged and deleted, so a later commit cannot adopt them.
    pub fn register(&mut self, files: &[String], message: Option<&str>) -> Result<Vec<PathBuf>> {
        let expanded = expand(files)?;

        let mut imported = Vec::new();
        let git = &self.git;
        let result = self.manifest.transaction(|manifest| {
            for file in &expanded {
                if manifest.contains(file) {
                    return Err(RegistryError::AlreadyRegistered(file.clone()).into());
                }

                import_file(git, file)?;
                imported.push(file.clone());
                manifest.set(file.clone(), FileEntry::default());
                info!(file = %file.display(), "Registered file");
            }
            Ok(())
        });

        if let Err(err) = result {
            for file in &imported {
                let relative = strip_root(file);
                if let Err(undo) = git.unstage(&relative) {
                    warn!(file = %file.display(), error = %undo, "Failed to unstage import of aborted batch");
                }
                if let Err(undo) = std::fs::remove_file(git.root().join(&relative)) {
                    warn!(file = %file.display(), error = %undo, "Failed to delete import of aborted batch");
                }
            }
            return Err(err);
        }

        self.git.commit(message)?;
        Ok(expanded)
    }

    /// Deregisters tracked files: the stored copy is deleted, removed from
    /// the pending change set, and dropped from the manifest. One commit
    /// per batch. Returns the canonical paths that were deregistered, in
    /// input order.
    ///
    /// The whole batch is validated up front; an untracked path rejects it
    /// before any stored copy is touched.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::NotRegistered`] for the first untracked
    /// path in the batch.
    pub fn deregister(&mut self, files: &[String], message: Option<&str>) -> Result<Vec<PathBuf>> {
        let expanded = expand(files)?;

        let git = &self.git;
        self.manifest.transaction(|manifest| {
            for file in &expanded {
                if !manifest.contains(file) {
                    return Err(RegistryError::NotRegistered(file.clone()).into());
                }
            }

            for file in &expanded {
                let stored = git.root().join(strip_root(file));
                std::fs::remove_file(&stored).with_context(|| {
                    format!("Failed to remove stored copy: {}", stored.display())
                })?;
                git.unstage(&strip_root(file))?;
                manifest.delete(file);
                info!(file = %file.display(), "Deregistered file");
            }
            Ok(())
        })?;

        self.git.commit(message)?;
        Ok(expanded)
    }

    /// Returns true if the given path is registered.
    ///
    /// # Errors
    ///
    /// Propagates path expansion and manifest read failures.
    pub fn registered(&self, file: &str) -> Result<bool> {
        let path = expand_user_path(file)?;
        Ok(self.manifest.load()?.contains(&path))
    }

    /// Returns tracked files for the requested paths, or for every
    /// registered path when `files` is empty.
    ///
    /// # Errors
    ///
    /// Fails fast with [`RegistryError::NotRegistered`] for a requested
    /// path absent from the manifest; unknown paths are never silently
    /// skipped.
    pub fn status(&self, files: &[String]) -> Result<Vec<TrackedFile>> {
        self.resolve(files)
    }

    /// Advances the stored baseline of every resolved file whose live
    /// content diverged, re-staging it; unchanged files are left untouched.
    /// The batch is committed once; with zero changed files the commit is
    /// skipped entirely.
    ///
    /// Returns the paths that were actually updated.
    ///
    /// # Errors
    ///
    /// Fails fast with [`RegistryError::NotRegistered`] for unknown
    /// requested paths; propagates diff, copy and backend failures.
    pub fn update(&self, files: &[String], message: Option<&str>) -> Result<Vec<PathBuf>> {
        let mut updated = Vec::new();

        for file in self.resolve(files)? {
            if file.diff(&self.diff_options)?.changed() {
                import_file(&self.git, &file.file_path)?;
                info!(file = %file.file_path.display(), "Updated stored copy");
                updated.push(file.file_path);
            }
        }

        self.git.commit(message)?;
        Ok(updated)
    }

    /// Reverts live files to their stored baseline. Never commits; only
    /// the live filesystem is mutated.
    ///
    /// A missing live file is recreated unconditionally. A diverged live
    /// file is only overwritten when `force` is set or the caller named
    /// paths explicitly; an unscoped restore skips diverged files and
    /// reports them, so a blanket restore cannot destroy local edits by
    /// accident.
    ///
    /// # Errors
    ///
    /// Fails fast with [`RegistryError::NotRegistered`] for unknown
    /// requested paths; propagates diff and copy failures.
    pub fn restore(&self, files: &[String], force: bool) -> Result<Vec<RestoreOutcome>> {
        let explicit = !files.is_empty();
        let mut outcomes = Vec::new();

        for file in self.resolve(files)? {
            let action = if !file.file_path.exists() {
                copy_atomic(&file.repository_location, &file.file_path)?;
                info!(file = %file.file_path.display(), "Restored missing file");
                RestoreAction::Restored
            } else if !file.diff(&self.diff_options)?.changed() {
                RestoreAction::InSync
            } else if force || explicit {
                copy_atomic(&file.repository_location, &file.file_path)?;
                info!(file = %file.file_path.display(), "Restored file");
                RestoreAction::Restored
            } else {
                debug!(file = %file.file_path.display(), "Skipped diverged file in unscoped restore");
                RestoreAction::Skipped
            };

            outcomes.push(RestoreOutcome {
                path: file.file_path,
                action,
            });
        }

        Ok(outcomes)
    }

    /// Resolves a user-supplied path list (or "all tracked" when empty)
    /// into tracked-file values.
    fn resolve(&self, files: &[String]) -> Result<Vec<TrackedFile>> {
        let manifest = self.manifest.load()?;

        let paths = if files.is_empty() {
            manifest.paths()
        } else {
            expand(files)?
        };

        paths
            .into_iter()
            .map(|path| self.tracked_file(&manifest, path))
            .collect()
    }

    /// Builds the tracked-file value for one canonical absolute path.
    fn tracked_file(&self, manifest: &Manifest, path: PathBuf) -> Result<TrackedFile> {
        if !manifest.contains(&path) {
            return Err(RegistryError::NotRegistered(path).into());
        }

        let stored = self.git.root().join(strip_root(&path));
        Ok(TrackedFile::new(path, stored))
    }
}

/// Canonicalizes every user-supplied path to absolute form.
fn expand(files: &[String]) -> Result<Vec<PathBuf>> {
    files.iter().map(|f| expand_user_path(f)).collect()
}

/// Copies the live file into the repository (replacing any previous stored
/// copy) and stages it.
fn import_file(git: &GitStore, file: &Path) -> Result<()> {
    let relative = strip_root(file);
    copy_atomic(file, &git.root().join(&relative))?;
    git.stage(&relative)
}

/// Copies `source` over `destination` by writing a temporary file next to
/// the destination and renaming it into place, so a copy that fails partway
/// never leaves a truncated file behind. Handles are closed on every exit
/// path.
fn copy_atomic(source: &Path, destination: &Path) -> Result<()> {
    ensure_parent_dirs(destination)?;

    let mut reader = File::open(source)
        .with_context(|| format!("Failed to open source file: {}", source.display()))?;

    let dir = destination
        .parent()
        .with_context(|| format!("Destination has no parent: {}", destination.display()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;

    std::io::copy(&mut reader, &mut tmp)
        .with_context(|| format!("Failed to copy {} into repository", source.display()))?;
    tmp.persist(destination)
        .with_context(|| format!("Failed to replace {}", destination.display()))?;
    Ok(())
}
