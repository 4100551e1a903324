//! # Batch Rename
//!
//! Recursively batch rename files and directories by regular expression.
//!
//! This crate provides:
//! - Filtering candidate entries with skip/exclude/include regex chains
//! - Computing new names with capture groups, sequence numbers (`{nr}`) and key-value lookups (`{kv}`)
//! - Detecting conflicts with existing paths and with other planned renames
//! - Executing all-or-nothing batches with an undo log
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use batch_rename::prelude::*;
//!
//! // a.jpeg -> a.jpg
//! let config = RenameOptions::new()
//!     .pattern(r"\.jpeg$")
//!     .replacement(".jpg")
//!     .recursive(true)
//!     .build()?;
//!
//! let result = Rename::new(config).path("./photos").apply()?;
//! println!("{} path(s) renamed", result.renamed);
//! # Ok::<(), batch_rename::error::RenameError>(())
//! ```
//!
//! ## Sequence Numbers
//!
//! ```rust,no_run
//! use batch_rename::prelude::*;
//!
//! // a.png, b.png -> img_001.png, img_002.png
//! let config = RenameOptions::new()
//!     .pattern(r"^\w+")
//!     .replacement("img_{nr}")
//!     .nr_width(3)
//!     .mode(RunMode::DryRun)
//!     .build()?;
//!
//! let result = Rename::new(config).path(".").apply()?;
//! for op in result.plan.accepted() {
//!     println!("{} -> {}", op.source.display(), op.target.display());
//! }
//! # Ok::<(), batch_rename::error::RenameError>(())
//! ```
//!
//! ## Undo
//!
//! ```rust,no_run
//! use batch_rename::prelude::*;
//! use std::path::Path;
//!
//! let report = undo::replay(&RealFs, Path::new(DEFAULT_UNDO_LOG), false)?;
//! println!("{} rename(s) undone", report.undone);
//! # Ok::<(), batch_rename::error::RenameError>(())
//! ```

pub mod config;
pub mod error;
pub mod execute;
pub mod fs;
pub mod matcher;
pub mod natsort;
pub mod plan;
pub mod rename;
pub mod report;
pub mod transform;
pub mod undo;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{
        DEFAULT_UNDO_LOG, DirMode, OverwriteMode, PathCase, RenameConfig, RenameOptions, RunMode,
        load_kv_file,
    };
    pub use crate::error::{RenameError, Result};
    pub use crate::execute::{Disposition, Executor, Observed, Plan, PlanEntry, RootFailure};
    pub use crate::fs::{Entry, EntryKind, FileSystem, RealFs};
    pub use crate::matcher::PathFilter;
    pub use crate::plan::{Classifier, ConflictTracker, Operation, Outcome, PlanEvent, Walker};
    pub use crate::rename::{Rename, RenameResult};
    pub use crate::transform::{NameTransformer, SequenceCounter, Transformed};
    pub use crate::undo::{self, UndoLog, UndoRecord, UndoReport};
}

pub use prelude::*;
