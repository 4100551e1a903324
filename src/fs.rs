//! Filesystem capability used by the planner and executor.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What kind of entry exists at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// A directory child as returned by [`FileSystem::list_children`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// The filesystem operations the rename engine needs.
///
/// All calls are fallible and never retried.
pub trait FileSystem: Send + Sync {
    /// Returns the kind of entry at `path`, or `None` if nothing is there.
    fn exists(&self, path: &Path) -> Option<EntryKind>;

    /// Lists the immediate children of a directory.
    fn list_children(&self, path: &Path) -> io::Result<Vec<Entry>>;

    /// Renames `from` to `to`.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Creates a directory and all missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// [`FileSystem`] backed by the real disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl FileSystem for RealFs {
    fn exists(&self, path: &Path) -> Option<EntryKind> {
        // symlink_metadata so a dangling link still counts as occupying the name
        let meta = fs::symlink_metadata(path).ok()?;
        if meta.is_dir() {
            Some(EntryKind::Dir)
        } else {
            Some(EntryKind::File)
        }
    }

    fn list_children(&self, path: &Path) -> io::Result<Vec<Entry>> {
        let mut children = Vec::new();
        for entry in WalkDir::new(path).min_depth(1).max_depth(1) {
            let entry = entry.map_err(io::Error::from)?;
            children.push(Entry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path().to_path_buf(),
                is_dir: entry.file_type().is_dir(),
            });
        }
        Ok(children)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_list_children_is_shallow() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        File::create(dir.path().join("a.txt")).unwrap();
        File::create(dir.path().join("sub/b.txt")).unwrap();

        let mut children = RealFs.list_children(dir.path()).unwrap();
        children.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(children.len(), 2);
        assert_eq!(children[0].name, "a.txt");
        assert!(!children[0].is_dir);
        assert_eq!(children[1].name, "sub");
        assert!(children[1].is_dir);
    }

    #[test]
    fn test_list_children_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert!(RealFs.list_children(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn test_exists_kinds() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("f")).unwrap();

        assert_eq!(RealFs.exists(&dir.path().join("f")), Some(EntryKind::File));
        assert_eq!(RealFs.exists(dir.path()), Some(EntryKind::Dir));
        assert_eq!(RealFs.exists(&dir.path().join("g")), None);
    }
}
