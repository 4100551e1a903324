//! Rename planning: conflict tracking, classification and tree walking.

pub mod classify;
pub mod tracker;
pub mod walk;

pub use classify::{Classifier, Operation, Outcome};
pub use tracker::ConflictTracker;
pub use walk::Walker;

use crate::error::RenameError;
use std::path::PathBuf;

/// A message from the walker to the executor.
#[derive(Debug)]
pub enum PlanEvent {
    Operation(Operation),
    /// Walking this root failed; its remaining entries were not planned.
    Failed { root: PathBuf, error: RenameError },
}
