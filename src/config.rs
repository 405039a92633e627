use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::diff::DiffOptions;

/// Top-level cir configuration, persisted as TOML.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Core settings (repository location).
    #[serde(default)]
    pub core: CoreConfig,

    /// Diff rendering settings.
    #[serde(default)]
    pub diff: DiffConfig,

    /// User identity used for commits.
    #[serde(default)]
    pub user: UserConfig,
}

/// Core settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Path of the cir repository directory.
    #[serde(default = "default_repo_path")]
    pub repo_path: PathBuf,
}

/// Diff rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Number of context lines around changes.
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
    /// Whether diff output is colorized.
    #[serde(default = "default_color")]
    pub color: bool,
}

/// User identity for commits recorded in the repository.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    /// Commit author name; falls back to `$USER` when unset.
    pub name: Option<String>,
}

fn default_repo_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    home.join(crate::DEFAULT_REPO_DIR)
}

const fn default_context_lines() -> usize {
    3
}

const fn default_color() -> bool {
    true
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            repo_path: default_repo_path(),
        }
    }
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            context_lines: default_context_lines(),
            color: default_color(),
        }
    }
}

impl Config {
    /// Loads the configuration from a file, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or created.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Saves the configuration to a file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }

    /// Diff rendering options derived from this configuration.
    #[must_use]
    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            context_lines: self.diff.context_lines,
            color: self.diff.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_creates_default() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config");

        let config = Config::load(&path)?;
        assert!(path.exists());
        assert_eq!(config.diff.context_lines, 3);
        assert!(config.diff.color);
        Ok(())
    }

    #[test]
    fn test_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config");

        let mut config = Config::default();
        config.core.repo_path = PathBuf::from("/srv/cir");
        config.user.name = Some("alice".to_string());
        config.save(&path)?;

        let loaded = Config::load(&path)?;
        assert_eq!(loaded.core.repo_path, PathBuf::from("/srv/cir"));
        assert_eq!(loaded.user.name.as_deref(), Some("alice"));
        Ok(())
    }

    #[test]
    fn test_partial_config_uses_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config");
        std::fs::write(&path, "[diff]\ncontext_lines = 5\n")?;

        let config = Config::load(&path)?;
        assert_eq!(config.diff.context_lines, 5);
        assert!(config.diff.color);
        Ok(())
    }
}
