//! # Path Classification
//!
//! Buckets a repository's relative path into a taxonomy category by
//! rewriting its leading segment. The store keys produced here are the join
//! keys for reconciliation across machines whose root directories differ,
//! so classification must be a pure function of the path and the alias
//! table.
//!
//! Matching is best-effort heuristic bucketing, not exact matching. The
//! alias table is an ordered list and the first matching entry wins; a
//! different order changes classification outcomes, so the order a table
//! was built with must be preserved.

use regex::Regex;

/// The deterministic fallback bucket for paths no alias claims.
pub const UNCLASSIFIED: &str = "unclassified";

/// One ordered alias-table entry: a canonical category name, the key
/// strings that claim it, and an optional regex.
#[derive(Debug, Clone)]
pub struct Alias {
    pub category: String,
    pub keys: Vec<String>,
    pub pattern: Option<Regex>,
}

impl Alias {
    pub fn new(category: impl Into<String>, keys: &[&str]) -> Self {
        Self {
            category: category.into(),
            keys: keys.iter().map(|k| (*k).to_string()).collect(),
            pattern: None,
        }
    }

    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }
}

/// Classifies relative paths against an immutable alias table.
///
/// The table is passed in at construction time, never read from ambient
/// state, so tests can supply distinct tables.
#[derive(Debug, Clone)]
pub struct Classifier {
    aliases: Vec<Alias>,
}

impl Classifier {
    pub fn new(aliases: Vec<Alias>) -> Self {
        Self { aliases }
    }

    /// The categories this table can produce, in table order, fallback
    /// excluded.
    pub fn categories(&self) -> Vec<&str> {
        self.aliases.iter().map(|a| a.category.as_str()).collect()
    }

    /// Map a relative filesystem path to its classified form: the leading
    /// segment replaced by the matched category (or the fallback bucket),
    /// the remainder untouched. Separators are normalized to `/`.
    pub fn classify(&self, relative_path: &str) -> String {
        let normalized = relative_path.replace('\\', "/");
        let mut segments: Vec<&str> = normalized.split('/').collect();
        let candidate = segments[0];
        let category = self.match_category(candidate, &normalized);
        segments[0] = category;
        segments.join("/")
    }

    /// Three passes, each scanning the table in order:
    /// 1. a key occurring within the leading segment (prefix, suffix, or
    ///    interior substring all accept);
    /// 2. a regex matching the leading segment;
    /// 3. a key occurring within the entire relative path, which covers
    ///    multi-segment alias tokens.
    fn match_category<'a>(&'a self, candidate: &str, full_path: &str) -> &'a str {
        if !candidate.is_empty() {
            for alias in &self.aliases {
                if alias
                    .keys
                    .iter()
                    .any(|key| !key.is_empty() && candidate.contains(key.as_str()))
                {
                    return &alias.category;
                }
            }
            for alias in &self.aliases {
                if let Some(pattern) = &alias.pattern {
                    if pattern.is_match(candidate) {
                        return &alias.category;
                    }
                }
            }
        }
        for alias in &self.aliases {
            if alias
                .keys
                .iter()
                .any(|key| !key.is_empty() && full_path.contains(key.as_str()))
            {
                return &alias.category;
            }
        }
        UNCLASSIFIED
    }
}
