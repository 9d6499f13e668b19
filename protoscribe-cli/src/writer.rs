//! File writer for the compiled proto set.
//!
//! The compiler produces (relative path, text) pairs; this module joins
//! them under the output root and writes them, with dry-run support.
//! Directory creation is implied by the path structure.

use crate::error::{CliResult, WriteError};
use protoscribe::OutputFile;
use std::path::{Path, PathBuf};

/// Result of a write operation.
#[derive(Debug)]
pub enum WriteResult {
    /// File was written successfully.
    Written {
        /// Path to the written file.
        path: PathBuf,
        /// Number of bytes written.
        bytes: usize,
    },
    /// Dry run - content was not written.
    DryRun {
        /// Path where content would have been written.
        path: PathBuf,
    },
}

impl WriteResult {
    /// Get the path associated with this result.
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path, .. } => path,
            WriteResult::DryRun { path } => path,
        }
    }

    /// Check if the write was performed (not dry-run).
    pub fn was_written(&self) -> bool {
        matches!(self, WriteResult::Written { .. })
    }
}

/// File writer with dry-run support.
#[derive(Debug)]
pub struct FileWriter {
    root: PathBuf,
    dry_run: bool,
}

impl FileWriter {
    /// Create a writer rooted at the output directory.
    pub fn new(root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            dry_run,
        }
    }

    /// Write every compiled file under the root.
    pub fn write_all(&self, outputs: &[OutputFile]) -> CliResult<Vec<WriteResult>> {
        outputs.iter().map(|output| self.write(output)).collect()
    }

    /// Write one compiled file under the root.
    ///
    /// In dry-run mode, returns the target path without writing.
    pub fn write(&self, output: &OutputFile) -> CliResult<WriteResult> {
        let path = self.root.join(&output.path);

        if self.dry_run {
            return Ok(WriteResult::DryRun { path });
        }

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| WriteError::CreateDir {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        std::fs::write(&path, &output.content).map_err(|e| WriteError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        Ok(WriteResult::Written {
            bytes: output.content.len(),
            path,
        })
    }

    /// Check if running in dry-run mode.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn output(path: &str, content: &str) -> OutputFile {
        OutputFile {
            path: PathBuf::from(path),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_write_file() {
        let dir = TempDir::new().unwrap();
        let writer = FileWriter::new(dir.path(), false);

        let result = writer.write(&output("game.proto", "package game;\n")).unwrap();

        assert!(result.was_written());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("game.proto")).unwrap(),
            "package game;\n"
        );
    }

    #[test]
    fn test_write_creates_package_directories() {
        let dir = TempDir::new().unwrap();
        let writer = FileWriter::new(dir.path(), false);

        writer.write(&output("my/game/net.proto", "package my.game.net;\n")).unwrap();

        assert!(dir.path().join("my/game/net.proto").exists());
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let dir = TempDir::new().unwrap();
        let writer = FileWriter::new(dir.path(), true);

        let result = writer.write(&output("game.proto", "package game;\n")).unwrap();

        assert!(!result.was_written());
        assert!(!dir.path().join("game.proto").exists());
        assert_eq!(result.path(), dir.path().join("game.proto"));
    }

    #[test]
    fn test_write_all_reports_every_file() {
        let dir = TempDir::new().unwrap();
        let writer = FileWriter::new(dir.path(), false);

        let results = writer
            .write_all(&[output("a.proto", "a"), output("b.proto", "b")])
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(WriteResult::was_written));
    }
}
