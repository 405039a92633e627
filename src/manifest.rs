use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::MANIFEST_FILE;

/// Current schema version of the manifest document.
pub const MANIFEST_VERSION: u32 = 1;

/// Per-path metadata record.
///
/// Currently empty; presence of the key in [`Manifest::files`] is what
/// denotes "registered". New attributes land here as explicit optional
/// fields together with a schema version bump, never as ad hoc keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {}

/// The tracked-file document persisted at the repository root.
///
/// A path is registered iff it is a key in `files`. Keys are canonical
/// absolute paths; a `BTreeMap` keeps the serialized document stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Schema version of this document.
    pub version: u32,
    /// Tracked paths and their metadata.
    #[serde(default)]
    pub files: BTreeMap<PathBuf, FileEntry>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            version: MANIFEST_VERSION,
            files: BTreeMap::new(),
        }
    }
}

/// Transactional store for the manifest document.
///
/// Single-process, single-writer: the `&mut self` receiver on
/// [`ManifestStore::transaction`] serializes callers at compile time, and
/// every flush goes through a temp file in the same directory followed by a
/// rename, so a partially-written document is never observable by a
/// subsequent open. There is no cross-process locking; concurrent processes
/// against one repository root are outside the supported model.
#[derive(Debug)]
pub struct ManifestStore {
    /// Location of the manifest document.
    path: PathBuf,
}

impl ManifestStore {
    /// Creates the manifest document under `root` with an empty file set.
    ///
    /// Must be called exactly once per repository, alongside repository
    /// creation.
    ///
    /// # Errors
    ///
    /// Fails if the document already exists or cannot be written.
    pub fn initialize(root: &Path) -> Result<Self> {
        let path = root.join(MANIFEST_FILE);
        if path.exists() {
            anyhow::bail!("Manifest already exists at {}", path.display());
        }

        let store = Self { path };
        store.flush(&Manifest::default())?;
        Ok(store)
    }

    /// Opens an existing manifest document under `root`.
    ///
    /// # Errors
    ///
    /// Fails if the document does not exist.
    pub fn open(root: &Path) -> Result<Self> {
        let path = root.join(MANIFEST_FILE);
        if !path.exists() {
            anyhow::bail!("No manifest found at {}", path.display());
        }
        Ok(Self { path })
    }

    /// Executes `block` with exclusive read-modify-write access to the
    /// document. Changes are durably flushed when the block returns `Ok`;
    /// an `Err` leaves the on-disk document untouched.
    ///
    /// # Errors
    ///
    /// Propagates errors from the block itself and from loading or
    /// flushing the document.
    pub fn transaction<T>(&mut self, block: impl FnOnce(&mut Manifest) -> Result<T>) -> Result<T> {
        let mut manifest = self.load()?;
        let result = block(&mut manifest)?;
        self.flush(&manifest)?;
        Ok(result)
    }

    /// Reads the document without opening a transaction.
    ///
    /// # Errors
    ///
    /// Fails if the document cannot be read or parsed.
    pub fn load(&self) -> Result<Manifest> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read manifest: {}", self.path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse manifest: {}", self.path.display()))
    }

    /// Serializes the document to a temp file and renames it into place.
    fn flush(&self, manifest: &Manifest) -> Result<()> {
        let toml_str =
            toml::to_string_pretty(manifest).context("Failed to serialize manifest")?;

        let dir = self
            .path
            .parent()
            .context("Manifest path has no parent directory")?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .context("Failed to create temporary manifest file")?;
        tmp.write_all(toml_str.as_bytes())
            .context("Failed to write manifest")?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to replace manifest: {}", self.path.display()))?;

        debug!(path = %self.path.display(), files = manifest.files.len(), "Manifest flushed");
        Ok(())
    }
}

impl Manifest {
    /// Returns true if `path` is registered.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    /// Metadata entry for `path`, if registered.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&FileEntry> {
        self.files.get(path)
    }

    /// Inserts or replaces the entry under `path`.
    pub fn set(&mut self, path: PathBuf, entry: FileEntry) {
        self.files.insert(path, entry);
    }

    /// Removes the entry under `path`, returning it if present.
    pub fn delete(&mut self, path: &Path) -> Option<FileEntry> {
        self.files.remove(path)
    }

    /// All registered paths, in stable order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.keys().cloned().collect()
    }
}
