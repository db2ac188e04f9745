//! Match highlighting
//!
//! User queries are always escaped before compilation, so they are matched
//! literally. Compiled patterns are kept in a small FIFO cache.

use parking_lot::Mutex;
use regex::{Regex, RegexBuilder};

use super::types::{HighlightField, SearchHighlight};
use crate::cache::BoundedCache;
use crate::error::Result;

/// Characters of context kept on each side of a match
pub const CONTEXT_RADIUS: usize = 20;

/// Default number of compiled patterns kept
pub const DEFAULT_PATTERN_CACHE_SIZE: usize = 50;

/// Finds and reports literal query matches
pub struct Highlighter {
    patterns: Mutex<BoundedCache<(String, bool), Regex>>,
}

impl Highlighter {
    pub fn new(max_patterns: usize) -> Self {
        Self {
            patterns: Mutex::new(BoundedCache::fifo(max_patterns)),
        }
    }

    /// Compiled literal pattern for `query`, from cache when possible
    pub fn compile(&self, query: &str, case_sensitive: bool) -> Result<Regex> {
        let key = (query.to_string(), case_sensitive);

        if let Some(regex) = self.patterns.lock().get(&key) {
            return Ok(regex);
        }

        let regex = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(!case_sensitive)
            .build()?;

        self.patterns.lock().set(key, regex.clone());

        Ok(regex)
    }

    /// Every non-overlapping match of `query` in `text`
    pub fn highlight_matches(
        &self,
        text: &str,
        query: &str,
        field: HighlightField,
        case_sensitive: bool,
    ) -> Result<Vec<SearchHighlight>> {
        if query.is_empty() || text.is_empty() {
            return Ok(Vec::new());
        }

        let regex = self.compile(query, case_sensitive)?;

        Ok(regex
            .find_iter(text)
            // find_iter already steps past empty matches; they carry nothing to show
            .filter(|m| !m.is_empty())
            .map(|m| SearchHighlight {
                field,
                start: m.start(),
                end: m.end(),
                text: m.as_str().to_string(),
                context: context_window(text, m.start(), m.end(), CONTEXT_RADIUS),
            })
            .collect())
    }

    pub fn cached_patterns(&self) -> usize {
        self.patterns.lock().len()
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN_CACHE_SIZE)
    }
}

/// Slice of `text` around `start..end`, widened by up to `radius` characters per side
pub fn context_window(text: &str, start: usize, end: usize, radius: usize) -> String {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(start, |(index, _)| index);

    let to = text[end..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(index, _)| end + index);

    text[from..to].to_string()
}
