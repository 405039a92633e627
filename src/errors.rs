use std::fmt;
use std::path::PathBuf;

/// Domain errors raised by registry operations.
///
/// These are detected eagerly, before any mutation for the offending path,
/// and abort the whole batch. Plain I/O and git failures are not wrapped
/// here; they propagate as-is through `anyhow`.
#[derive(Debug)]
pub enum RegistryError {
    /// Repository creation was attempted on a path that already exists.
    RepositoryExists(PathBuf),
    /// Registration was attempted for a path that is already tracked.
    AlreadyRegistered(PathBuf),
    /// An operation referenced a path that is not tracked.
    NotRegistered(PathBuf),
}

impl RegistryError {
    /// Short description of the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RepositoryExists(_) => "repository exists",
            Self::AlreadyRegistered(_) => "already registered",
            Self::NotRegistered(_) => "not registered",
        }
    }

    /// The path the error refers to.
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::RepositoryExists(p) | Self::AlreadyRegistered(p) | Self::NotRegistered(p) => p,
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RepositoryExists(path) => {
                write!(f, "Repository path {} already exists", path.display())
            }
            Self::AlreadyRegistered(path) => {
                write!(f, "File {} is already registered", path.display())
            }
            Self::NotRegistered(path) => {
                write!(f, "File {} is not registered", path.display())
            }
        }
    }
}

impl std::error::Error for RegistryError {}
