//! Classifies a candidate path into a planned rename with an outcome code.

use super::tracker::ConflictTracker;
use crate::config::{PathCase, RenameConfig};
use crate::error::Result;
use crate::fs::FileSystem;
use crate::transform::{NameTransformer, SequenceCounter, Transformed};
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// The classification result for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Target computed, no conflict.
    Ok,
    /// Pattern matched but the name is unchanged.
    Unchanged,
    /// The new name is empty.
    MissingTarget,
    EndingWithPeriod,
    EndingWithSpace,
    /// The target already exists on disk.
    Existed,
    /// Another planned rename already claimed the target.
    OverwriteNewPath,
}

impl Outcome {
    /// Outcomes that can never be executed.
    pub fn is_invalid_name(self) -> bool {
        matches!(
            self,
            Outcome::MissingTarget | Outcome::EndingWithPeriod | Outcome::EndingWithSpace
        )
    }

    /// Outcomes governed by the overwrite mode.
    pub fn is_conflict(self) -> bool {
        matches!(self, Outcome::Existed | Outcome::OverwriteNewPath)
    }
}

/// A planned rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub source: PathBuf,
    pub target: PathBuf,
    pub outcome: Outcome,
}

impl Operation {
    fn new(source: &Path, target: PathBuf, outcome: Outcome) -> Self {
        Self {
            source: source.to_path_buf(),
            target,
            outcome,
        }
    }
}

/// Assigns outcome codes to candidate paths.
pub struct Classifier<'a> {
    fs: &'a dyn FileSystem,
    tracker: &'a mut ConflictTracker,
    pattern: Regex,
    transformer: NameTransformer,
    counter: SequenceCounter,
    path_case: PathCase,
}

impl<'a> Classifier<'a> {
    pub fn new(
        config: &RenameConfig,
        fs: &'a dyn FileSystem,
        tracker: &'a mut ConflictTracker,
    ) -> Self {
        Self {
            fs,
            tracker,
            pattern: config.pattern.clone(),
            transformer: NameTransformer::from_config(config),
            counter: SequenceCounter::new(config.start_num),
            path_case: config.path_case,
        }
    }

    /// Classifies `path`. Returns `None` when the pattern does not match its name.
    ///
    /// Errors once the `{nr}` sequence is exhausted.
    pub fn classify(&mut self, path: &Path, is_dir: bool) -> Result<Option<Operation>> {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return Ok(None);
        };
        if !self.pattern.is_match(self.transformer.matchable(name, is_dir)) {
            return Ok(None);
        }

        let new_name = match self.transformer.transform(name, is_dir, &mut self.counter)? {
            Transformed::Renamed(n) => n,
            Transformed::Unchanged => {
                return Ok(Some(Operation::new(
                    path,
                    path.to_path_buf(),
                    Outcome::Unchanged,
                )));
            }
        };

        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        let target = if new_name.is_empty() {
            dir.to_path_buf()
        } else {
            dir.join(&new_name)
        };

        let outcome = if new_name.is_empty() {
            Outcome::MissingTarget
        } else if new_name.ends_with('.') {
            Outcome::EndingWithPeriod
        } else if new_name.ends_with(' ') {
            Outcome::EndingWithSpace
        } else if new_name == name {
            Outcome::Unchanged
        } else if self.existed(path, &target) {
            Outcome::Existed
        } else if !self.tracker.claim(&target) {
            Outcome::OverwriteNewPath
        } else {
            Outcome::Ok
        };

        Ok(Some(Operation::new(path, target, outcome)))
    }

    /// Matches `path` without transforming it. Used when only listing.
    pub fn list(&self, path: &Path, is_dir: bool) -> Option<Operation> {
        let name = path.file_name()?.to_str()?;
        if !self.pattern.is_match(self.transformer.matchable(name, is_dir)) {
            return None;
        }
        Some(Operation::new(path, path.to_path_buf(), Outcome::Unchanged))
    }

    /// The value the next `{nr}` substitution will use, `None` once exhausted.
    pub fn next_sequence(&self) -> Option<u64> {
        self.counter.peek()
    }

    // A case-only rename must not be flagged against the source itself.
    fn existed(&self, source: &Path, target: &Path) -> bool {
        if self.path_case.normalize(source) == self.path_case.normalize(target) {
            return false;
        }
        self.fs.exists(target).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenameOptions;
    use crate::fs::RealFs;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn config(pattern: &str, replacement: &str) -> RenameConfig {
        RenameOptions::new()
            .pattern(pattern)
            .replacement(replacement)
            .path_case(PathCase::Sensitive)
            .build()
            .unwrap()
    }

    #[test]
    fn test_no_match_is_none() {
        let cfg = config("zzz", "y");
        let mut tracker = ConflictTracker::new(cfg.path_case);
        let mut c = Classifier::new(&cfg, &RealFs, &mut tracker);
        assert!(c.classify(Path::new("dir/a.txt"), false).unwrap().is_none());
    }

    #[test]
    fn test_ok_and_overwrite_new_path() {
        let dir = TempDir::new().unwrap();
        let cfg = config(r"a\d", "a");
        let mut tracker = ConflictTracker::new(cfg.path_case);
        let mut c = Classifier::new(&cfg, &RealFs, &mut tracker);

        let first = c.classify(&dir.path().join("a1.txt"), false).unwrap().unwrap();
        let second = c.classify(&dir.path().join("a2.txt"), false).unwrap().unwrap();

        assert_eq!(first.outcome, Outcome::Ok);
        assert_eq!(first.target, dir.path().join("a.txt"));
        assert_eq!(second.outcome, Outcome::OverwriteNewPath);
    }

    #[test]
    fn test_existed() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("x.txt")).unwrap();
        File::create(dir.path().join("y.txt")).unwrap();

        let cfg = config("x", "y");
        let mut tracker = ConflictTracker::new(cfg.path_case);
        let mut c = Classifier::new(&cfg, &RealFs, &mut tracker);

        let op = c.classify(&dir.path().join("x.txt"), false).unwrap().unwrap();
        assert_eq!(op.outcome, Outcome::Existed);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_invalid_names() {
        let cfg = config(".+", "");
        let mut tracker = ConflictTracker::new(cfg.path_case);
        let mut c = Classifier::new(&cfg, &RealFs, &mut tracker);
        let op = c.classify(Path::new("d/file.txt"), false).unwrap().unwrap();
        assert_eq!(op.outcome, Outcome::MissingTarget);

        let cfg = config(r"\.txt$", ".");
        let mut tracker = ConflictTracker::new(cfg.path_case);
        let mut c = Classifier::new(&cfg, &RealFs, &mut tracker);
        let op = c.classify(Path::new("d/file.txt"), false).unwrap().unwrap();
        assert_eq!(op.outcome, Outcome::EndingWithPeriod);

        let cfg = config(r"\.txt$", " ");
        let mut tracker = ConflictTracker::new(cfg.path_case);
        let mut c = Classifier::new(&cfg, &RealFs, &mut tracker);
        let op = c.classify(Path::new("d/file.txt"), false).unwrap().unwrap();
        assert_eq!(op.outcome, Outcome::EndingWithSpace);
    }

    #[test]
    fn test_identity_is_unchanged() {
        let cfg = config(".+", "$0");
        let mut tracker = ConflictTracker::new(cfg.path_case);
        let mut c = Classifier::new(&cfg, &RealFs, &mut tracker);
        let op = c.classify(Path::new("d/file.txt"), false).unwrap().unwrap();
        assert_eq!(op.outcome, Outcome::Unchanged);
    }

    #[test]
    fn test_repeat_classification_is_stable() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("y.txt")).unwrap();
        let cfg = config("x", "y");
        let mut tracker = ConflictTracker::new(cfg.path_case);
        let mut c = Classifier::new(&cfg, &RealFs, &mut tracker);

        let path = dir.path().join("x.txt");
        let a = c.classify(&path, false).unwrap().unwrap();
        let b = c.classify(&path, false).unwrap().unwrap();
        assert_eq!(a.outcome, b.outcome);
    }

    #[test]
    fn test_counter_advances_on_rejected_candidates() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("keep_1")).unwrap();

        let cfg = RenameOptions::new()
            .pattern(r"^f.*")
            .replacement("keep_{nr}")
            .start_num(1)
            .path_case(PathCase::Sensitive)
            .build()
            .unwrap();
        let mut tracker = ConflictTracker::new(cfg.path_case);
        let mut c = Classifier::new(&cfg, &RealFs, &mut tracker);

        let first = c.classify(&dir.path().join("fa"), false).unwrap().unwrap();
        assert_eq!(first.outcome, Outcome::Existed);
        let second = c.classify(&dir.path().join("fb"), false).unwrap().unwrap();
        assert_eq!(second.outcome, Outcome::Ok);
        assert_eq!(second.target, dir.path().join("keep_2"));
        assert_eq!(c.next_sequence(), Some(3));
    }

    #[test]
    fn test_case_only_rename_is_not_existed() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("readme"), "x").unwrap();

        let cfg = RenameOptions::new()
            .pattern("readme")
            .replacement("README")
            .path_case(PathCase::Insensitive)
            .build()
            .unwrap();
        let mut tracker = ConflictTracker::new(cfg.path_case);
        let mut c = Classifier::new(&cfg, &RealFs, &mut tracker);

        let op = c.classify(&dir.path().join("readme"), false).unwrap().unwrap();
        assert_eq!(op.outcome, Outcome::Ok);
    }

    #[test]
    fn test_exhausted_sequence_is_an_error() {
        let cfg = RenameOptions::new()
            .pattern(r"^f.*")
            .replacement("n{nr}")
            .start_num(u64::MAX)
            .path_case(PathCase::Sensitive)
            .build()
            .unwrap();
        let mut tracker = ConflictTracker::new(cfg.path_case);
        let mut c = Classifier::new(&cfg, &RealFs, &mut tracker);

        let last = c.classify(Path::new("d/fa"), false).unwrap().unwrap();
        assert_eq!(last.target, Path::new("d").join(format!("n{}", u64::MAX)));
        let err = c.classify(Path::new("d/fb"), false).unwrap_err();
        assert!(matches!(err, crate::error::RenameError::SequenceExhausted));
        // non-matching names never touch the counter
        assert!(c.classify(Path::new("d/x"), false).unwrap().is_none());
    }

    #[test]
    fn test_list_does_not_transform() {
        let cfg = RenameOptions::new()
            .pattern("a")
            .replacement("{nr}")
            .mode(crate::config::RunMode::List)
            .build()
            .unwrap();
        let mut tracker = ConflictTracker::new(cfg.path_case);
        let c = Classifier::new(&cfg, &RealFs, &mut tracker);

        let op = c.list(Path::new("a.txt"), false).unwrap();
        assert_eq!(op.target, Path::new("a.txt"));
        assert_eq!(c.next_sequence(), Some(1));
    }
}
