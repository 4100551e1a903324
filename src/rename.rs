//! The rename session: walks roots, classifies, buckets and executes.

use crate::config::RenameConfig;
use crate::error::Result;
use crate::execute::{Executor, Observed, Plan};
use crate::fs::{FileSystem, RealFs};
use crate::plan::{ConflictTracker, Walker};
use std::path::{Path, PathBuf};
use std::thread;

/// Capacity of the queue between the walker and the executor.
pub const PIPELINE_CAPACITY: usize = 1024;

/// The result of a rename session.
#[derive(Debug)]
pub struct RenameResult {
    pub plan: Plan,
    /// Paths actually renamed; zero for dry runs and listings.
    pub renamed: usize,
}

/// One batch rename over a set of root paths.
pub struct Rename {
    config: RenameConfig,
    roots: Vec<PathBuf>,
}

impl Rename {
    /// Creates a session for the given configuration.
    pub fn new(config: RenameConfig) -> Self {
        Self {
            config,
            roots: Vec::new(),
        }
    }

    /// Adds a root path (file or directory).
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.roots.push(path.into());
        self
    }

    /// Adds multiple root paths.
    pub fn paths(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.roots.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn config(&self) -> &RenameConfig {
        &self.config
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Walks and classifies every root, reporting each item to `observer` as it arrives.
    ///
    /// Every call starts from an empty conflict tracker shared by all roots of that pass.
    /// The walker runs on its own thread; nothing on disk changes here.
    pub fn plan_with<F>(&self, fs: &dyn FileSystem, observer: F) -> Plan
    where
        F: FnMut(Observed<'_>),
    {
        let (tx, rx) = crossbeam_channel::bounded(PIPELINE_CAPACITY);
        let executor = Executor::new(&self.config);
        let config = &self.config;
        let roots = &self.roots;

        thread::scope(|s| {
            s.spawn(move || {
                let mut tracker = ConflictTracker::new(config.path_case);
                let mut walker = Walker::new(config, fs, &mut tracker);
                walker.walk_roots(roots, &tx);
                // tx dropped here, closing the stream
            });
            executor.consume(rx, observer)
        })
    }

    /// Plans and commits with the real filesystem.
    pub fn apply(self) -> Result<RenameResult> {
        self.apply_with(&RealFs, |_| {})
    }

    /// Plans, then commits according to the run mode.
    pub fn apply_with<F>(self, fs: &dyn FileSystem, observer: F) -> Result<RenameResult>
    where
        F: FnMut(Observed<'_>),
    {
        let plan = self.plan_with(fs, observer);
        let renamed = plan.commit(fs, &self.config.undo_log)?;
        Ok(RenameResult { plan, renamed })
    }

    /// Location of the undo log written by this session.
    pub fn undo_log(&self) -> &Path {
        &self.config.undo_log
    }
}
