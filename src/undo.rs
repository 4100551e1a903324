//! Undo log: one line per executed rename, replayed in reverse to undo a run.

use crate::error::{RenameError, Result};
use crate::fs::FileSystem;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Separator between source and target on each log line.
pub const UNDO_DELIMITER: &str = "\t=>\t";

/// One executed rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoRecord {
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Append-only writer for the undo log.
#[derive(Debug)]
pub struct UndoLog {
    path: PathBuf,
    file: File,
}

impl UndoLog {
    /// Creates (or truncates) the log at `path`.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        Ok(Self { path, file })
    }

    /// Appends one record and flushes it to disk.
    pub fn append(&mut self, source: &Path, target: &Path) -> Result<()> {
        writeln!(
            self.file,
            "{}{}{}",
            source.display(),
            UNDO_DELIMITER,
            target.display()
        )?;
        self.file.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record in written order.
    pub fn read(path: &Path) -> Result<Vec<UndoRecord>> {
        if !path.exists() {
            return Err(RenameError::PathNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        parse(&content)
    }
}

fn parse(content: &str) -> Result<Vec<UndoRecord>> {
    let mut records = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let Some((source, target)) = line.split_once(UNDO_DELIMITER) else {
            return Err(RenameError::UndoLogCorrupt {
                line: idx + 1,
                content: line.to_string(),
            });
        };
        records.push(UndoRecord {
            source: PathBuf::from(source),
            target: PathBuf::from(target),
        });
    }
    Ok(records)
}

/// Outcome of an undo replay.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UndoReport {
    pub undone: usize,
    pub failed: usize,
}

/// Renames every logged target back to its source, newest first, then deletes the log.
///
/// Without `force` the first failure stops the replay and the log is kept.
pub fn replay(fs: &dyn FileSystem, log: &Path, force: bool) -> Result<UndoReport> {
    let records = UndoLog::read(log)?;
    let mut report = UndoReport::default();

    for record in records.iter().rev() {
        match restore(fs, record) {
            Ok(()) => {
                info!(from = %record.target.display(), to = %record.source.display(), "undone");
                report.undone += 1;
            }
            Err(e) => {
                error!(from = %record.target.display(), to = %record.source.display(), error = %e, "undo failed");
                report.failed += 1;
                if !force {
                    return Err(RenameError::Undo {
                        failed: report.failed,
                        undone: report.undone,
                    });
                }
            }
        }
    }

    fs::remove_file(log)?;
    Ok(report)
}

fn restore(fs: &dyn FileSystem, record: &UndoRecord) -> std::io::Result<()> {
    if let Some(parent) = record.source.parent()
        && !parent.as_os_str().is_empty()
        && fs.exists(parent).is_none()
    {
        fs.create_dir_all(parent)?;
    }
    fs.rename(&record.target, &record.source)
}
