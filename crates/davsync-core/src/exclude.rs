//! Exclude matcher
//!
//! Decides whether a file is ineligible for transfer. Each configured
//! pattern is a regular expression searched (unanchored) in the bare file
//! name. Directory names and full paths are never matched.

use regex::Regex;
use tracing::warn;

/// Compiled exclude patterns, in configuration order
///
/// A pattern that fails to compile is dropped after a warning. It never
/// excludes anything and does not abort the run.
#[derive(Debug, Clone, Default)]
pub struct ExcludeMatcher {
    patterns: Vec<Regex>,
}

impl ExcludeMatcher {
    /// Compile `patterns`, logging a warning for each invalid one
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|p| {
                let p = p.as_ref();
                match Regex::new(p) {
                    Ok(re) => Some(re),
                    Err(err) => {
                        warn!(pattern = p, error = %err, "Invalid exclude pattern, ignoring it");
                        None
                    }
                }
            })
            .collect();
        Self { patterns }
    }

    /// True when the first matching pattern flags `file_name`
    pub fn is_excluded(&self, file_name: &str) -> bool {
        self.matching_pattern(file_name).is_some()
    }

    /// The first pattern that matches `file_name`, if any
    pub fn matching_pattern(&self, file_name: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|re| re.is_match(file_name))
            .map(Regex::as_str)
    }
}
