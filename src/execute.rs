//! Plan executor: buckets classified operations and performs the accepted renames.

use crate::config::{OverwriteMode, PathCase, RenameConfig, RunMode};
use crate::error::{RenameError, Result};
use crate::fs::FileSystem;
use crate::plan::{Operation, Outcome, PlanEvent};
use crate::undo::UndoLog;
use crossbeam_channel::Receiver;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// What the executor decided for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Will be renamed.
    Accepted,
    /// Left alone without failing the run.
    Dropped,
    /// Counted as an error; blocks the whole run.
    Error,
    /// Matched in list mode.
    Listed,
}

/// An operation together with its disposition.
#[derive(Debug, Clone, Serialize)]
pub struct PlanEntry {
    #[serde(flatten)]
    pub op: Operation,
    pub disposition: Disposition,
}

/// A root path whose walk failed.
#[derive(Debug)]
pub struct RootFailure {
    pub root: PathBuf,
    pub error: RenameError,
}

/// What the executor reports to its observer while consuming.
#[derive(Debug, Clone, Copy)]
pub enum Observed<'a> {
    Entry(&'a PlanEntry),
    Failed(&'a RootFailure),
}

/// Consumes the operation stream. Sole owner of the aggregated plan state.
#[derive(Debug, Clone)]
pub struct Executor {
    mode: RunMode,
    overwrite: OverwriteMode,
    path_case: PathCase,
    fail_on_warnings: bool,
}

impl Executor {
    pub fn new(config: &RenameConfig) -> Self {
        Self {
            mode: config.mode,
            overwrite: config.overwrite,
            path_case: config.path_case,
            fail_on_warnings: config.fail_on_warnings,
        }
    }

    /// Decides the disposition of one operation.
    pub fn dispose(&self, op: &Operation) -> Disposition {
        if self.mode == RunMode::List {
            return Disposition::Listed;
        }
        match op.outcome {
            Outcome::Ok => Disposition::Accepted,
            Outcome::Unchanged => Disposition::Dropped,
            outcome if outcome.is_conflict() => match self.overwrite {
                OverwriteMode::Overwrite => Disposition::Accepted,
                OverwriteMode::Skip => Disposition::Dropped,
                OverwriteMode::Report => Disposition::Error,
            },
            _ => Disposition::Error,
        }
    }

    /// Drains `rx` until every sender is gone, calling `observer` for each item.
    pub fn consume<F>(&self, rx: Receiver<PlanEvent>, mut observer: F) -> Plan
    where
        F: FnMut(Observed<'_>),
    {
        let mut plan = Plan {
            entries: Vec::new(),
            failures: Vec::new(),
            mode: self.mode,
            path_case: self.path_case,
            fail_on_warnings: self.fail_on_warnings,
        };

        for event in rx {
            match event {
                PlanEvent::Operation(op) => {
                    let disposition = self.dispose(&op);
                    plan.entries.push(PlanEntry { op, disposition });
                    if let Some(entry) = plan.entries.last() {
                        observer(Observed::Entry(entry));
                    }
                }
                PlanEvent::Failed { root, error } => {
                    plan.failures.push(RootFailure { root, error });
                    if let Some(failure) = plan.failures.last() {
                        observer(Observed::Failed(failure));
                    }
                }
            }
        }

        plan
    }
}

/// The fully classified plan for a run.
#[derive(Debug)]
pub struct Plan {
    entries: Vec<PlanEntry>,
    failures: Vec<RootFailure>,
    mode: RunMode,
    path_case: PathCase,
    fail_on_warnings: bool,
}

impl Plan {
    /// Every operation in classification order.
    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn failures(&self) -> &[RootFailure] {
        &self.failures
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Operations that will be renamed, in classification order.
    pub fn accepted(&self) -> impl Iterator<Item = &Operation> {
        self.with(Disposition::Accepted)
    }

    /// Entries matched in list mode.
    pub fn listed(&self) -> impl Iterator<Item = &Operation> {
        self.with(Disposition::Listed)
    }

    pub fn count(&self, disposition: Disposition) -> usize {
        self.with(disposition).count()
    }

    pub fn count_outcome(&self, outcome: Outcome) -> usize {
        self.entries.iter().filter(|e| e.op.outcome == outcome).count()
    }

    /// Errored operations plus failed roots.
    pub fn error_count(&self) -> usize {
        self.count(Disposition::Error) + self.failures.len()
    }

    fn with(&self, disposition: Disposition) -> impl Iterator<Item = &Operation> {
        self.entries
            .iter()
            .filter(move |e| e.disposition == disposition)
            .map(|e| &e.op)
    }

    /// Finishes the run according to its mode. Returns the number of renames performed.
    pub fn commit(&self, fs: &dyn FileSystem, undo_log: &Path) -> Result<usize> {
        match self.mode {
            RunMode::List => Ok(0),
            RunMode::DryRun if self.fail_on_warnings && self.error_count() > 0 => {
                Err(RenameError::PlanRejected {
                    errors: self.error_count(),
                })
            }
            RunMode::DryRun => Ok(0),
            RunMode::Rename => self.execute(fs, undo_log),
        }
    }

    /// Renames every accepted operation, all or nothing with respect to plan errors.
    ///
    /// A failure mid-batch stops immediately; renames already done stay in the undo log.
    pub fn execute(&self, fs: &dyn FileSystem, undo_log: &Path) -> Result<usize> {
        let errors = self.error_count();
        if errors > 0 {
            return Err(RenameError::PlanRejected { errors });
        }
        if self.count(Disposition::Accepted) == 0 {
            return Ok(0);
        }

        let mut log = UndoLog::create(undo_log)?;
        let mut renamed = 0;

        for op in self.accepted() {
            self.rename_one(fs, op)
                .map_err(|source| RenameError::Execution {
                    source_path: op.source.clone(),
                    target: op.target.clone(),
                    source,
                })?;
            log.append(&op.source, &op.target)?;
            info!(from = %op.source.display(), to = %op.target.display(), "renamed");
            renamed += 1;
        }

        Ok(renamed)
    }

    fn rename_one(&self, fs: &dyn FileSystem, op: &Operation) -> io::Result<()> {
        // a target that appeared after planning is not ours to replace
        if op.outcome == Outcome::Ok
            && self.path_case.normalize(&op.source) != self.path_case.normalize(&op.target)
            && fs.exists(&op.target).is_some()
        {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "target appeared after planning",
            ));
        }

        if let Some(parent) = op.target.parent()
            && !parent.as_os_str().is_empty()
            && fs.exists(parent).is_none()
        {
            fs.create_dir_all(parent)?;
        }

        fs.rename(&op.source, &op.target)
    }
}
