use anyhow::{Context, Result};
use colored::Colorize;
use content_inspector::{ContentType, inspect};
use similar::{Algorithm, ChangeTag, TextDiff};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, span};

/// Rendering options for diff output.
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Number of context lines around changes.
    pub context_lines: usize,
    /// Whether to colorize the output for terminal display.
    pub color: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            context_lines: 3,
            color: true,
        }
    }
}

/// A computed comparison between a stored copy and a live file.
///
/// The stored copy is always the source (baseline) and the live file the
/// destination (candidate change), so rendered diffs read as "what changed
/// since the last update". Pure value; holds no open handles.
#[derive(Debug)]
pub struct FileDiff {
    /// Path displayed for the baseline side.
    source_path: PathBuf,
    /// Path displayed for the candidate side.
    destination_path: PathBuf,
    /// Baseline content; empty when the file is absent.
    source: Vec<u8>,
    /// Candidate content; empty when the file is absent.
    destination: Vec<u8>,
    options: DiffOptions,
}

impl FileDiff {
    /// Reads both files and builds the comparison.
    ///
    /// A missing file on either side is treated as empty content, so a
    /// deleted live file shows up as changed rather than as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read.
    pub fn between(source: &Path, destination: &Path, options: &DiffOptions) -> Result<Self> {
        let span = span!(Level::DEBUG, "diff", path = %destination.display());
        let _guard = span.enter();

        Ok(Self {
            source_path: source.to_path_buf(),
            destination_path: destination.to_path_buf(),
            source: read_or_empty(source)?,
            destination: read_or_empty(destination)?,
            options: options.clone(),
        })
    }

    /// Returns true iff the two inputs differ in content.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.source != self.destination
    }

    /// Returns true when either side looks like binary data.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        is_binary(&self.source) || is_binary(&self.destination)
    }

    /// Renders the diff as a unified-diff string.
    ///
    /// Binary pairs render as a single "Binary files ... differ" line
    /// instead of a hunk listing.
    #[must_use]
    pub fn render(&self) -> String {
        if !self.changed() {
            return String::new();
        }

        if self.is_binary() {
            return format!(
                "Binary files {} and {} differ\n",
                self.source_path.display(),
                self.destination_path.display()
            );
        }

        let old_content = String::from_utf8_lossy(&self.source);
        let new_content = String::from_utf8_lossy(&self.destination);

        let diff = TextDiff::configure()
            .algorithm(Algorithm::Myers)
            .diff_lines(old_content.as_ref(), new_content.as_ref());

        let mut output = String::new();

        let old_header = format!("--- {}", self.source_path.display());
        let new_header = format!("+++ {}", self.destination_path.display());
        if self.options.color {
            let _ = writeln!(output, "{}", old_header.red());
            let _ = writeln!(output, "{}", new_header.green());
        } else {
            let _ = writeln!(output, "{old_header}");
            let _ = writeln!(output, "{new_header}");
        }

        let mut total_changes = 0;

        for hunk in diff
            .unified_diff()
            .context_radius(self.options.context_lines)
            .iter_hunks()
        {
            let hunk_header = hunk.header().to_string();
            if self.options.color {
                let _ = writeln!(output, "{}", hunk_header.cyan());
            } else {
                let _ = writeln!(output, "{hunk_header}");
            }

            for change in hunk.iter_changes() {
                total_changes += 1;

                let line = match change.tag() {
                    ChangeTag::Delete => {
                        let line = format!("-{change}");
                        if self.options.color {
                            line.red().to_string()
                        } else {
                            line
                        }
                    }
                    ChangeTag::Insert => {
                        let line = format!("+{change}");
                        if self.options.color {
                            line.green().to_string()
                        } else {
                            line
                        }
                    }
                    ChangeTag::Equal => format!(" {change}"),
                };

                let _ = write!(output, "{line}");
                if !line.ends_with('\n') {
                    let _ = writeln!(output);
                }
            }
        }

        debug!(
            path = %self.destination_path.display(),
            changes = total_changes,
            "Diff rendering complete"
        );

        output
    }
}

/// Reads a file's content, mapping a missing file to empty bytes.
fn read_or_empty(path: &Path) -> Result<Vec<u8>> {
    if path.exists() {
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
    } else {
        Ok(Vec::new())
    }
}

/// Inspects the first 8KB of a buffer for binary content.
fn is_binary(data: &[u8]) -> bool {
    if data.is_empty() {
        return false;
    }
    let probe = &data[..data.len().min(8192)];
    matches!(inspect(probe), ContentType::BINARY)
}
