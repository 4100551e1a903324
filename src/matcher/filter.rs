//! Skip/exclude/include filter chains for candidate entries.

use crate::config::RenameConfig;
use regex::Regex;

/// Decides whether an entry name is considered at all.
///
/// Order matters: skip beats exclude, exclude beats include, and an entry
/// matching no include pattern is rejected.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    skip: Vec<Regex>,
    exclude: Vec<Regex>,
    include: Vec<Regex>,
}

impl PathFilter {
    /// Creates a filter from compiled pattern lists.
    pub fn new(skip: Vec<Regex>, exclude: Vec<Regex>, include: Vec<Regex>) -> Self {
        Self {
            skip,
            exclude,
            include,
        }
    }

    /// Creates the filter described by a run configuration.
    pub fn from_config(config: &RenameConfig) -> Self {
        Self::new(
            config.skip_filters.clone(),
            config.exclude_filters.clone(),
            config.include_filters.clone(),
        )
    }

    /// Returns true if the name survives the filter chain.
    pub fn includes(&self, name: &str) -> bool {
        if self.is_skipped(name) {
            return false;
        }
        if self.exclude.iter().any(|re| re.is_match(name)) {
            return false;
        }
        self.include.iter().any(|re| re.is_match(name))
    }

    /// Returns true if a skip pattern matches. Skipped directories are not descended into.
    pub fn is_skipped(&self, name: &str) -> bool {
        self.skip.iter().any(|re| re.is_match(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(patterns: &[&str]) -> Vec<Regex> {
        patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
    }

    #[test]
    fn test_default_deny() {
        let filter = PathFilter::new(vec![], vec![], vec![]);
        assert!(!filter.includes("anything"));
    }

    #[test]
    fn test_include_all() {
        let filter = PathFilter::new(vec![], vec![], res(&["."]));
        assert!(filter.includes("a.txt"));
    }

    #[test]
    fn test_exclude_beats_include() {
        let filter = PathFilter::new(vec![], res(&[r"\.bak$"]), res(&["."]));
        assert!(filter.includes("a.txt"));
        assert!(!filter.includes("a.bak"));
    }

    #[test]
    fn test_skip_beats_include() {
        let filter = PathFilter::new(res(&[r"^\.git$"]), vec![], res(&["git"]));
        assert!(!filter.includes(".git"));
        assert!(filter.is_skipped(".git"));
        assert!(filter.includes("gitignore"));
    }

    #[test]
    fn test_include_must_match() {
        let filter = PathFilter::new(vec![], vec![], res(&[r"\.jpe?g$"]));
        assert!(filter.includes("photo.jpg"));
        assert!(!filter.includes("notes.txt"));
    }
}
