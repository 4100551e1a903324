//! Recursive tree walker that feeds candidates through the filter and classifier.

use super::PlanEvent;
use super::classify::Classifier;
use super::tracker::ConflictTracker;
use crate::config::{RenameConfig, RunMode};
use crate::error::{RenameError, Result};
use crate::fs::{Entry, EntryKind, FileSystem};
use crate::matcher::PathFilter;
use crate::natsort;
use crossbeam_channel::Sender;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Walks root paths and emits classified operations.
pub struct Walker<'a> {
    config: &'a RenameConfig,
    fs: &'a dyn FileSystem,
    filter: PathFilter,
    classifier: Classifier<'a>,
    undo_log: Option<PathBuf>,
}

impl<'a> Walker<'a> {
    pub fn new(
        config: &'a RenameConfig,
        fs: &'a dyn FileSystem,
        tracker: &'a mut ConflictTracker,
    ) -> Self {
        Self {
            config,
            fs,
            filter: PathFilter::from_config(config),
            classifier: Classifier::new(config, fs, tracker),
            undo_log: resolve(&config.undo_log),
        }
    }

    /// Walks every root in order. A failing root is reported and the next one continues.
    pub fn walk_roots<P: AsRef<Path>>(&mut self, roots: &[P], tx: &Sender<PlanEvent>) {
        for root in roots {
            self.walk_root(root.as_ref(), tx);
        }
    }

    /// Walks a single root path.
    pub fn walk_root(&mut self, root: &Path, tx: &Sender<PlanEvent>) {
        let result = match self.fs.exists(root) {
            None => Err(RenameError::PathNotFound(root.to_path_buf())),
            Some(EntryKind::File) => self.visit(root, false, tx),
            Some(EntryKind::Dir) => self.walk(root, 1, tx).and_then(|()| {
                if self.config.dir_mode.renames_dirs() {
                    self.visit(root, true, tx)
                } else {
                    Ok(())
                }
            }),
        };

        if let Err(error) = result {
            warn!(root = %root.display(), %error, "walk aborted");
            // the receiver outlives every sender
            tx.send(PlanEvent::Failed {
                root: root.to_path_buf(),
                error,
            })
            .ok();
        }
    }

    fn walk(&mut self, dir: &Path, depth: usize, tx: &Sender<PlanEvent>) -> Result<()> {
        if self.config.max_depth > 0 && depth > self.config.max_depth {
            return Ok(());
        }
        debug!(dir = %dir.display(), depth, "walking");

        let children = self
            .fs
            .list_children(dir)
            .map_err(|source| RenameError::Traversal {
                path: dir.to_path_buf(),
                source,
            })?;

        let (mut dirs, mut files): (Vec<Entry>, Vec<Entry>) =
            children.into_iter().partition(|e| e.is_dir);
        self.order(&mut files);
        self.order(&mut dirs);

        if self.config.dir_mode.renames_files() {
            for file in &files {
                self.visit(&file.path, false, tx)?;
            }
        }

        for sub in &dirs {
            if self.config.recursive && !self.filter.is_skipped(&sub.name) {
                self.walk(&sub.path, depth + 1, tx)?;
            }
            // planned with the pre-rename name, after its children
            if self.config.dir_mode.renames_dirs() {
                self.visit(&sub.path, true, tx)?;
            }
        }

        Ok(())
    }

    fn visit(&mut self, path: &Path, is_dir: bool, tx: &Sender<PlanEvent>) -> Result<()> {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return Ok(());
        };
        if !is_dir && self.is_undo_log(path, name) {
            return Ok(());
        }
        if !self.filter.includes(name) {
            return Ok(());
        }

        let op = if self.config.mode == RunMode::List {
            self.classifier.list(path, is_dir)
        } else {
            self.classifier.classify(path, is_dir)?
        };

        if let Some(op) = op {
            debug!(source = %op.source.display(), target = %op.target.display(), outcome = ?op.outcome, "classified");
            tx.send(PlanEvent::Operation(op)).ok();
        }
        Ok(())
    }

    // Same file name is cheap to test; only then resolve both sides.
    fn is_undo_log(&self, path: &Path, name: &str) -> bool {
        self.config.undo_log_name() == Some(name)
            && self.undo_log.is_some()
            && resolve(path) == self.undo_log
    }

    fn order(&self, entries: &mut [Entry]) {
        if self.config.mode == RunMode::List && self.config.natural_sort {
            entries.sort_by(|a, b| natsort::compare(&a.name, &b.name));
        } else {
            entries.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }
}

/// Absolute, symlink-free form of `path`. A missing file resolves through its parent.
fn resolve(path: &Path) -> Option<PathBuf> {
    if let Ok(resolved) = std::fs::canonicalize(path) {
        return Some(resolved);
    }
    let name = path.file_name()?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::canonicalize(parent).ok().map(|p| p.join(name))
}
