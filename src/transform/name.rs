//! Computes replacement names from a matched entry name.

use crate::config::{KV_PLACEHOLDER, KvConfig, NR_PLACEHOLDER, RenameConfig};
use crate::error::{RenameError, Result};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

static GROUP_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\$|\$([0-9A-Za-z_]+)").expect("static regex"));

/// Monotonic counter behind the `{nr}` placeholder.
///
/// `u64::MAX` is handed out once; after that the counter is exhausted.
#[derive(Debug, Clone)]
pub struct SequenceCounter {
    next: Option<u64>,
}

impl SequenceCounter {
    pub fn new(start: u64) -> Self {
        Self { next: Some(start) }
    }

    /// Returns the current value and advances by one.
    pub fn advance(&mut self) -> Result<u64> {
        let current = self.next.ok_or(RenameError::SequenceExhausted)?;
        self.next = current.checked_add(1);
        Ok(current)
    }

    /// The value the next candidate will receive, `None` once exhausted.
    pub fn peek(&self) -> Option<u64> {
        self.next
    }
}

/// Result of transforming one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformed {
    Renamed(String),
    /// The key-value lookup missed with no fallback configured.
    Unchanged,
}

/// Applies the replacement template to entry names.
#[derive(Debug, Clone)]
pub struct NameTransformer {
    pattern: Regex,
    template: String,
    ignore_ext: bool,
    ignore_case: bool,
    nr_width: usize,
    kv: KvConfig,
}

impl NameTransformer {
    pub fn new(pattern: Regex, replacement: &str) -> Self {
        Self {
            pattern,
            template: brace_group_refs(replacement),
            ignore_ext: false,
            ignore_case: false,
            nr_width: 1,
            kv: KvConfig::default(),
        }
    }

    pub fn from_config(config: &RenameConfig) -> Self {
        Self {
            ignore_ext: config.ignore_ext,
            ignore_case: config.ignore_case,
            nr_width: config.nr_width,
            kv: config.kv.clone(),
            ..Self::new(config.pattern.clone(), &config.replacement)
        }
    }

    pub fn ignore_ext(mut self, yes: bool) -> Self {
        self.ignore_ext = yes;
        self
    }

    pub fn nr_width(mut self, width: usize) -> Self {
        self.nr_width = width;
        self
    }

    pub fn kv(mut self, kv: KvConfig, ignore_case: bool) -> Self {
        self.kv = kv;
        self.ignore_case = ignore_case;
        self
    }

    /// The part of the name the pattern is matched against.
    pub fn matchable<'a>(&self, name: &'a str, is_dir: bool) -> &'a str {
        self.split(name, is_dir).0
    }

    /// Transforms `name`, advancing `counter` if the template uses `{nr}`.
    ///
    /// Fails only when the counter is exhausted.
    pub fn transform(
        &self,
        name: &str,
        is_dir: bool,
        counter: &mut SequenceCounter,
    ) -> Result<Transformed> {
        let (stem, ext) = self.split(name, is_dir);
        let mut template = Cow::Borrowed(self.template.as_str());

        if template.contains(NR_PLACEHOLDER) {
            let nr = format!("{:0width$}", counter.advance()?, width = self.nr_width);
            template = Cow::Owned(template.replace(NR_PLACEHOLDER, &nr));
        }

        if template.contains(KV_PLACEHOLDER) {
            let Some(value) = self.lookup(stem) else {
                return Ok(Transformed::Unchanged);
            };
            template = Cow::Owned(template.replace(KV_PLACEHOLDER, &value.replace('$', "$$")));
        }

        let replaced = self.pattern.replace_all(stem, template.as_ref());
        Ok(Transformed::Renamed(format!("{replaced}{ext}")))
    }

    // A key group that took no part in the match is a miss, not a skip.
    fn lookup(&self, stem: &str) -> Option<String> {
        let key = self
            .pattern
            .captures(stem)
            .and_then(|caps| caps.get(self.kv.key_capture))
            .map(|m| m.as_str());

        if let Some(key) = key {
            let folded: Cow<'_, str> = if self.ignore_case {
                Cow::Owned(key.to_lowercase())
            } else {
                Cow::Borrowed(key)
            };
            if let Some(value) = self.kv.table.get(folded.as_ref()) {
                return Some(value.clone());
            }
            if self.kv.keep_key {
                return Some(key.to_string());
            }
        }
        self.kv.miss_replacement.clone()
    }

    fn split<'a>(&self, name: &'a str, is_dir: bool) -> (&'a str, &'a str) {
        if self.ignore_ext && !is_dir {
            split_extension(name)
        } else {
            (name, "")
        }
    }
}

/// Splits `name` at its last `.`; a leading dot alone does not start an extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

// `$1` becomes `${1}` so text substituted next to a reference cannot extend its name.
fn brace_group_refs(template: &str) -> String {
    GROUP_REF
        .replace_all(template, |caps: &Captures| match caps.get(1) {
            Some(name) => format!("${{{}}}", name.as_str()),
            None => "$$".to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn renamed(t: Result<Transformed>) -> String {
        match t.unwrap() {
            Transformed::Renamed(s) => s,
            Transformed::Unchanged => panic!("expected a rename"),
        }
    }

    #[test]
    fn test_simple_replace() {
        let t = NameTransformer::new(Regex::new(r"\.jpeg$").unwrap(), ".jpg");
        let mut nr = SequenceCounter::new(1);
        assert_eq!(renamed(t.transform("a.jpeg", false, &mut nr)), "a.jpg");
    }

    #[test]
    fn test_backreferences() {
        let t = NameTransformer::new(Regex::new("([ab]+)").unwrap(), "$1$1");
        let mut nr = SequenceCounter::new(1);
        assert_eq!(renamed(t.transform("ab.png", false, &mut nr)), "abab.png");
    }

    #[test]
    fn test_whole_match_identity() {
        let t = NameTransformer::new(Regex::new(".+").unwrap(), "$0");
        let mut nr = SequenceCounter::new(1);
        assert_eq!(renamed(t.transform("file.txt", false, &mut nr)), "file.txt");
    }

    #[test]
    fn test_sequence_number() {
        let t = NameTransformer::new(Regex::new(r"^(\w+)").unwrap(), "img_{nr}").nr_width(3);
        let mut nr = SequenceCounter::new(9);
        assert_eq!(renamed(t.transform("a.png", false, &mut nr)), "img_009.png");
        assert_eq!(renamed(t.transform("b.png", false, &mut nr)), "img_010.png");
        assert_eq!(nr.peek(), Some(11));
    }

    #[test]
    fn test_sequence_exhausted_at_max() {
        let t = NameTransformer::new(Regex::new(r"^\w+").unwrap(), "img_{nr}");
        let mut nr = SequenceCounter::new(u64::MAX);
        let last = format!("img_{}.png", u64::MAX);
        assert_eq!(renamed(t.transform("a.png", false, &mut nr)), last);
        assert_eq!(nr.peek(), None);

        let err = t.transform("b.png", false, &mut nr).unwrap_err();
        assert!(matches!(err, RenameError::SequenceExhausted));
    }

    #[test]
    fn test_sequence_number_after_group_ref() {
        let t = NameTransformer::new(Regex::new(r"^(\w)\w*").unwrap(), "$1{nr}").nr_width(2);
        let mut nr = SequenceCounter::new(5);
        assert_eq!(renamed(t.transform("abc.txt", false, &mut nr)), "a05.txt");
    }

    #[test]
    fn test_counter_untouched_without_placeholder() {
        let t = NameTransformer::new(Regex::new("a").unwrap(), "b");
        let mut nr = SequenceCounter::new(1);
        t.transform("a", false, &mut nr).unwrap();
        assert_eq!(nr.peek(), Some(1));
    }

    #[test]
    fn test_ignore_extension() {
        let t = NameTransformer::new(Regex::new(r"\..*$").unwrap(), "").ignore_ext(true);
        let mut nr = SequenceCounter::new(1);
        assert_eq!(renamed(t.transform("a.b.txt", false, &mut nr)), "a.txt");
        // directories keep their full name in play
        assert_eq!(renamed(t.transform("v1.2", true, &mut nr)), "v1");
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("a.tar.gz"), ("a.tar", ".gz"));
        assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
        assert_eq!(split_extension("README"), ("README", ""));
    }

    fn kv(table: &[(&str, &str)]) -> KvConfig {
        KvConfig {
            table: table
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
            key_capture: 1,
            keep_key: false,
            miss_replacement: None,
        }
    }

    #[test]
    fn test_kv_hit() {
        let t = NameTransformer::new(Regex::new(r"^(\w+)").unwrap(), "{kv}")
            .kv(kv(&[("a", "apple")]), false);
        let mut nr = SequenceCounter::new(1);
        assert_eq!(renamed(t.transform("a.txt", false, &mut nr)), "apple.txt");
    }

    #[test]
    fn test_kv_value_is_literal() {
        let t = NameTransformer::new(Regex::new(r"^(\w+)").unwrap(), "{kv}")
            .kv(kv(&[("a", "$1cost")]), false);
        let mut nr = SequenceCounter::new(1);
        assert_eq!(renamed(t.transform("a.txt", false, &mut nr)), "$1cost.txt");
    }

    #[test]
    fn test_kv_ignore_case() {
        let t = NameTransformer::new(Regex::new(r"^(\w+)").unwrap(), "{kv}")
            .kv(kv(&[("abc", "x")]), true);
        let mut nr = SequenceCounter::new(1);
        assert_eq!(renamed(t.transform("ABC.txt", false, &mut nr)), "x.txt");
    }

    #[test]
    fn test_kv_miss_fallbacks() {
        let re = Regex::new(r"^(\w+)").unwrap();
        let mut nr = SequenceCounter::new(1);

        let mut keep = kv(&[]);
        keep.keep_key = true;
        keep.miss_replacement = Some("none".into());
        let t = NameTransformer::new(re.clone(), "{kv}").kv(keep, false);
        assert_eq!(renamed(t.transform("z.txt", false, &mut nr)), "z.txt");

        let mut miss = kv(&[]);
        miss.miss_replacement = Some("none".into());
        let t = NameTransformer::new(re.clone(), "{kv}").kv(miss, false);
        assert_eq!(renamed(t.transform("z.txt", false, &mut nr)), "none.txt");

        let t = NameTransformer::new(re, "{kv}").kv(kv(&[]), false);
        assert_eq!(t.transform("z.txt", false, &mut nr).unwrap(), Transformed::Unchanged);
    }

    #[test]
    fn test_kv_key_group_not_matched() {
        let re = Regex::new(r"^(a)?(\w+)").unwrap();
        let mut nr = SequenceCounter::new(1);

        let mut miss = kv(&[("a", "apple")]);
        miss.miss_replacement = Some("none".into());
        let t = NameTransformer::new(re.clone(), "{kv}").kv(miss, false);
        assert_eq!(renamed(t.transform("b.txt", false, &mut nr)), "none.txt");
        assert_eq!(renamed(t.transform("ab.txt", false, &mut nr)), "apple.txt");

        // no key to keep, so keep-key falls through to the miss replacement
        let mut keep = kv(&[]);
        keep.keep_key = true;
        keep.miss_replacement = Some("none".into());
        let t = NameTransformer::new(re.clone(), "{kv}").kv(keep, false);
        assert_eq!(renamed(t.transform("b.txt", false, &mut nr)), "none.txt");

        let t = NameTransformer::new(re, "{kv}").kv(kv(&[]), false);
        assert_eq!(t.transform("b.txt", false, &mut nr).unwrap(), Transformed::Unchanged);
    }

    #[test]
    fn test_brace_group_refs() {
        assert_eq!(brace_group_refs("$1-$name$$"), "${1}-${name}$$");
        assert_eq!(brace_group_refs("${2}x"), "${2}x");
    }
}
