use anyhow::Result;
use std::path::PathBuf;

use crate::diff::{DiffOptions, FileDiff};

/// A registered file, pairing its live location with its stored copy.
///
/// Constructed on demand for each registry operation and discarded after
/// use; never cached across calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFile {
    /// Absolute path of the live file.
    pub file_path: PathBuf,
    /// Path of the versioned copy inside the repository.
    pub repository_location: PathBuf,
}

impl TrackedFile {
    /// Creates a tracked-file value.
    #[must_use]
    pub const fn new(file_path: PathBuf, repository_location: PathBuf) -> Self {
        Self {
            file_path,
            repository_location,
        }
    }

    /// Compares the stored copy (baseline) against the live file
    /// (candidate change).
    ///
    /// The ordering is deliberate: rendered diffs read as "what changed
    /// since the last update".
    ///
    /// # Errors
    ///
    /// Returns an error if either existing file cannot be read.
    pub fn diff(&self, options: &DiffOptions) -> Result<FileDiff> {
        FileDiff::between(&self.repository_location, &self.file_path, options)
    }
}
