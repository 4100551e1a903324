//! Tracks target paths already claimed by planned renames.

use crate::config::PathCase;
use std::collections::HashSet;
use std::path::Path;

/// Set of claimed target paths, normalized by the path-case policy.
///
/// Grows monotonically for the lifetime of one rename session.
#[derive(Debug, Clone)]
pub struct ConflictTracker {
    case: PathCase,
    claimed: HashSet<String>,
}

impl ConflictTracker {
    pub fn new(case: PathCase) -> Self {
        Self {
            case,
            claimed: HashSet::new(),
        }
    }

    /// Claims `target`. Returns false if an equivalent path was already claimed.
    pub fn claim(&mut self, target: &Path) -> bool {
        self.claimed.insert(self.case.normalize(target))
    }

    pub fn is_claimed(&self, target: &Path) -> bool {
        self.claimed.contains(&self.case.normalize(target))
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_twice() {
        let mut tracker = ConflictTracker::new(PathCase::Sensitive);
        assert!(tracker.claim(Path::new("dir/a.txt")));
        assert!(!tracker.claim(Path::new("dir/a.txt")));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_case_sensitive_distinct() {
        let mut tracker = ConflictTracker::new(PathCase::Sensitive);
        assert!(tracker.claim(Path::new("A.txt")));
        assert!(tracker.claim(Path::new("a.txt")));
    }

    #[test]
    fn test_case_insensitive_collides() {
        let mut tracker = ConflictTracker::new(PathCase::Insensitive);
        assert!(tracker.claim(Path::new("A.txt")));
        assert!(tracker.is_claimed(Path::new("a.TXT")));
        assert!(!tracker.claim(Path::new("a.txt")));
    }
}
