//! Run configuration: a fluent options builder validated into an immutable [`RenameConfig`].

use crate::error::{RenameError, Result};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Placeholder replaced by the sequence number.
pub const NR_PLACEHOLDER: &str = "{nr}";

/// Placeholder replaced by the key-value lookup result.
pub const KV_PLACEHOLDER: &str = "{kv}";

/// Default location of the undo log, relative to the working directory.
pub const DEFAULT_UNDO_LOG: &str = ".brn_undo.log";

/// How `Existed` and `OverwriteNewPath` outcomes are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverwriteMode {
    /// Count as an error and abort the run.
    #[default]
    Report,
    /// Rename anyway, replacing the existing path.
    Overwrite,
    /// Leave the entry alone without failing.
    Skip,
}

/// Which kinds of entries are renamed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DirMode {
    #[default]
    Files,
    IncludingDirs,
    OnlyDirs,
}

impl DirMode {
    pub fn renames_dirs(self) -> bool {
        matches!(self, DirMode::IncludingDirs | DirMode::OnlyDirs)
    }

    pub fn renames_files(self) -> bool {
        !matches!(self, DirMode::OnlyDirs)
    }
}

/// Case policy for comparing target paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCase {
    Sensitive,
    Insensitive,
}

impl Default for PathCase {
    fn default() -> Self {
        if cfg!(any(windows, target_os = "macos")) {
            PathCase::Insensitive
        } else {
            PathCase::Sensitive
        }
    }
}

impl PathCase {
    /// Normalizes a path string for comparison under this policy.
    pub fn normalize(self, path: &Path) -> String {
        let s = path.to_string_lossy();
        match self {
            PathCase::Sensitive => s.into_owned(),
            PathCase::Insensitive => s.to_lowercase(),
        }
    }
}

/// What a run does with its plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    #[default]
    Rename,
    DryRun,
    List,
}

/// Key-value substitution settings for the `{kv}` placeholder.
#[derive(Debug, Clone, Default)]
pub struct KvConfig {
    pub table: HashMap<String, String>,
    /// 1-based capture group whose text is the lookup key.
    pub key_capture: usize,
    pub keep_key: bool,
    pub miss_replacement: Option<String>,
}

/// Validated, immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct RenameConfig {
    pub pattern: Regex,
    pub replacement: String,
    pub ignore_case: bool,
    pub path_case: PathCase,
    pub recursive: bool,
    pub max_depth: usize,
    pub dir_mode: DirMode,
    pub skip_filters: Vec<Regex>,
    pub exclude_filters: Vec<Regex>,
    pub include_filters: Vec<Regex>,
    pub overwrite: OverwriteMode,
    pub start_num: u64,
    pub nr_width: usize,
    pub kv: KvConfig,
    pub ignore_ext: bool,
    pub mode: RunMode,
    pub list_abs: bool,
    pub list_sep: String,
    pub natural_sort: bool,
    pub fail_on_warnings: bool,
    pub undo_log: PathBuf,
}

impl RenameConfig {
    pub fn uses_nr(&self) -> bool {
        self.replacement.contains(NR_PLACEHOLDER)
    }

    pub fn uses_kv(&self) -> bool {
        self.replacement.contains(KV_PLACEHOLDER)
    }

    /// File name of the undo log; entries with this name are never renamed.
    pub fn undo_log_name(&self) -> Option<&str> {
        self.undo_log.file_name().and_then(|n| n.to_str())
    }
}

/// Builder for [`RenameConfig`].
#[derive(Debug, Clone)]
pub struct RenameOptions {
    pattern: Option<String>,
    replacement: Option<String>,
    ignore_case: bool,
    path_case: PathCase,
    recursive: bool,
    max_depth: usize,
    dir_mode: DirMode,
    skip_filters: Vec<String>,
    exclude_filters: Vec<String>,
    include_filters: Vec<String>,
    overwrite: OverwriteMode,
    start_num: u64,
    nr_width: usize,
    kv_table: Option<HashMap<String, String>>,
    kv_file: Option<PathBuf>,
    key_capture: usize,
    keep_key: bool,
    miss_replacement: Option<String>,
    ignore_ext: bool,
    mode: RunMode,
    list_abs: bool,
    list_sep: String,
    natural_sort: bool,
    fail_on_warnings: bool,
    undo_log: PathBuf,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            pattern: None,
            replacement: None,
            ignore_case: false,
            path_case: PathCase::default(),
            recursive: false,
            max_depth: 0,
            dir_mode: DirMode::Files,
            skip_filters: Vec::new(),
            exclude_filters: Vec::new(),
            include_filters: Vec::new(),
            overwrite: OverwriteMode::Report,
            start_num: 1,
            nr_width: 1,
            kv_table: None,
            kv_file: None,
            key_capture: 1,
            keep_key: false,
            miss_replacement: None,
            ignore_ext: false,
            mode: RunMode::Rename,
            list_abs: false,
            list_sep: "\n".to_string(),
            natural_sort: false,
            fail_on_warnings: false,
            undo_log: PathBuf::from(DEFAULT_UNDO_LOG),
        }
    }
}

impl RenameOptions {
    /// Creates options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the regular expression matched against entry names.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Sets the replacement template. Supports `$1`, `${name}`, `{nr}` and `{kv}`.
    pub fn replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = Some(replacement.into());
        self
    }

    /// Matches the pattern, filters and kv keys case-insensitively.
    pub fn ignore_case(mut self, yes: bool) -> Self {
        self.ignore_case = yes;
        self
    }

    pub fn path_case(mut self, case: PathCase) -> Self {
        self.path_case = case;
        self
    }

    pub fn recursive(mut self, yes: bool) -> Self {
        self.recursive = yes;
        self
    }

    /// Limits descent; 0 means unlimited.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn dir_mode(mut self, mode: DirMode) -> Self {
        self.dir_mode = mode;
        self
    }

    pub fn skip(mut self, pattern: impl Into<String>) -> Self {
        self.skip_filters.push(pattern.into());
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_filters.push(pattern.into());
        self
    }

    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include_filters.push(pattern.into());
        self
    }

    pub fn overwrite(mut self, mode: OverwriteMode) -> Self {
        self.overwrite = mode;
        self
    }

    /// First value substituted for `{nr}`.
    pub fn start_num(mut self, start: u64) -> Self {
        self.start_num = start;
        self
    }

    /// Minimum width of `{nr}`, zero-padded.
    pub fn nr_width(mut self, width: usize) -> Self {
        self.nr_width = width;
        self
    }

    /// Supplies the `{kv}` table directly.
    pub fn kv_table(mut self, table: HashMap<String, String>) -> Self {
        self.kv_table = Some(table);
        self
    }

    /// Loads the `{kv}` table from a tab-delimited file at build time.
    pub fn kv_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.kv_file = Some(path.into());
        self
    }

    /// 1-based capture group used as the `{kv}` key.
    pub fn key_capture(mut self, index: usize) -> Self {
        self.key_capture = index;
        self
    }

    pub fn keep_key(mut self, yes: bool) -> Self {
        self.keep_key = yes;
        self
    }

    pub fn miss_replacement(mut self, repl: impl Into<String>) -> Self {
        self.miss_replacement = Some(repl.into());
        self
    }

    pub fn ignore_ext(mut self, yes: bool) -> Self {
        self.ignore_ext = yes;
        self
    }

    pub fn mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn list_abs(mut self, yes: bool) -> Self {
        self.list_abs = yes;
        self
    }

    pub fn list_sep(mut self, sep: impl Into<String>) -> Self {
        self.list_sep = sep.into();
        self
    }

    pub fn natural_sort(mut self, yes: bool) -> Self {
        self.natural_sort = yes;
        self
    }

    /// Makes a dry run fail when errors were counted.
    pub fn fail_on_warnings(mut self, yes: bool) -> Self {
        self.fail_on_warnings = yes;
        self
    }

    pub fn undo_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.undo_log = path.into();
        self
    }

    /// Compiles and validates the options.
    pub fn build(self) -> Result<RenameConfig> {
        let pattern_src = self
            .pattern
            .ok_or_else(|| RenameError::InvalidConfig("a search pattern is required".into()))?;
        let pattern = compile(&pattern_src, self.ignore_case)?;

        let replacement = match (self.replacement, self.mode) {
            (Some(r), _) => r,
            (None, RunMode::List) => String::new(),
            (None, _) => {
                return Err(RenameError::InvalidConfig(
                    "a replacement is required unless listing".into(),
                ));
            }
        };

        if self.nr_width == 0 {
            return Err(RenameError::InvalidConfig("nr width must be at least 1".into()));
        }

        let mut kv = KvConfig {
            table: HashMap::new(),
            key_capture: self.key_capture,
            keep_key: self.keep_key,
            miss_replacement: self.miss_replacement,
        };

        if replacement.contains(KV_PLACEHOLDER) && self.mode != RunMode::List {
            kv.table = match (self.kv_table, self.kv_file) {
                (Some(table), _) => fold_keys(table, self.ignore_case),
                (None, Some(path)) => load_kv_file(&path, self.ignore_case)?,
                (None, None) => {
                    return Err(RenameError::InvalidConfig(format!(
                        "{KV_PLACEHOLDER} in replacement requires a key-value file"
                    )));
                }
            };
            let groups = pattern.captures_len() - 1;
            if kv.key_capture == 0 || kv.key_capture > groups {
                return Err(RenameError::InvalidConfig(format!(
                    "key capture index {} out of range: pattern has {} capture group(s)",
                    kv.key_capture, groups
                )));
            }
        }

        let include_src = if self.include_filters.is_empty() {
            vec![".".to_string()]
        } else {
            self.include_filters
        };

        Ok(RenameConfig {
            pattern,
            replacement,
            ignore_case: self.ignore_case,
            path_case: self.path_case,
            recursive: self.recursive,
            max_depth: self.max_depth,
            dir_mode: self.dir_mode,
            skip_filters: compile_all(&self.skip_filters, self.ignore_case)?,
            exclude_filters: compile_all(&self.exclude_filters, self.ignore_case)?,
            include_filters: compile_all(&include_src, self.ignore_case)?,
            overwrite: self.overwrite,
            start_num: self.start_num,
            nr_width: self.nr_width,
            kv,
            ignore_ext: self.ignore_ext,
            mode: self.mode,
            list_abs: self.list_abs,
            list_sep: self.list_sep,
            natural_sort: self.natural_sort,
            fail_on_warnings: self.fail_on_warnings,
            undo_log: self.undo_log,
        })
    }
}

fn compile(pattern: &str, ignore_case: bool) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern)
        .case_insensitive(ignore_case)
        .build()?)
}

fn compile_all(patterns: &[String], ignore_case: bool) -> Result<Vec<Regex>> {
    patterns.iter().map(|p| compile(p, ignore_case)).collect()
}

fn fold_keys(table: HashMap<String, String>, ignore_case: bool) -> HashMap<String, String> {
    if !ignore_case {
        return table;
    }
    table
        .into_iter()
        .map(|(k, v)| (k.to_lowercase(), v))
        .collect()
}

/// Reads a `key<TAB>value` file. Blank lines and `#` comments are ignored.
pub fn load_kv_file(path: &Path, ignore_case: bool) -> Result<HashMap<String, String>> {
    let content = fs::read_to_string(path)?;
    parse_kv(&content, path, ignore_case)
}

fn parse_kv(content: &str, path: &Path, ignore_case: bool) -> Result<HashMap<String, String>> {
    let mut table = HashMap::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('\t') else {
            return Err(RenameError::KvFile {
                path: path.to_path_buf(),
                line: idx + 1,
                message: "expected key and value separated by a tab".into(),
            });
        };

        let key = if ignore_case {
            key.to_lowercase()
        } else {
            key.to_string()
        };

        if let Some(prev) = table.insert(key.clone(), value.to_string()) {
            warn!(key = %key, previous = %prev, line = idx + 1, "duplicated key in kv file, later value wins");
        }
    }

    Ok(table)
}
