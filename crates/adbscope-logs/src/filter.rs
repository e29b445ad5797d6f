use regex::Regex;
use std::collections::HashSet;

use adbscope_types::{ArcLogEntry, LogEntry, Severity};

/// Text filters shorter than this are ignored, so typing the first one or
/// two characters does not collapse the view.
pub const MIN_FILTER_CHARS: usize = 3;

/// Filter criteria for log entries
#[derive(Clone, Default)]
pub struct FilterCriteria {
    /// Severities to include (empty = all)
    severities: HashSet<Severity>,

    /// Text as typed
    text: String,

    /// Folded text, set only when long enough to take effect
    needle: Option<String>,

    /// Literal matcher for the needle, run over folded messages
    highlight: Option<Regex>,
}

impl FilterCriteria {
    /// Criteria that let everything through
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the severities to filter by
    pub fn with_severities<I>(mut self, severities: I) -> Self
    where
        I: IntoIterator<Item = Severity>,
    {
        self.severities = severities.into_iter().collect();
        self
    }

    /// Set the text to filter by
    pub fn with_text(mut self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    /// Replace the filter text
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.recompile();
    }

    /// Add a character to the filter text
    pub fn push_char(&mut self, c: char) {
        self.text.push(c);
        self.recompile();
    }

    /// Remove the last character of the filter text
    pub fn pop_char(&mut self) {
        self.text.pop();
        self.recompile();
    }

    pub fn clear_text(&mut self) {
        self.set_text("");
    }

    /// Deselect every severity, letting all of them through
    pub fn clear_severities(&mut self) {
        self.severities.clear();
    }

    /// Drop both the text and the severity selection
    pub fn clear(&mut self) {
        self.clear_severities();
        self.clear_text();
    }

    fn recompile(&mut self) {
        if self.text.chars().count() < MIN_FILTER_CHARS {
            self.needle = None;
            self.highlight = None;
            return;
        }

        let needle = fold(&self.text);
        self.highlight = Regex::new(&regex::escape(&needle)).ok();
        self.needle = Some(needle);
    }

    /// Flip one severity switch. Returns whether it is now selected.
    pub fn toggle_severity(&mut self, severity: Severity) -> bool {
        if self.severities.remove(&severity) {
            false
        } else {
            self.severities.insert(severity);
            true
        }
    }

    pub fn is_selected(&self, severity: Severity) -> bool {
        self.severities.contains(&severity)
    }

    pub fn severities(&self) -> &HashSet<Severity> {
        &self.severities
    }

    /// No severity switch selected means every severity passes
    pub fn allows_all_severities(&self) -> bool {
        self.severities.is_empty()
    }

    /// The text as typed
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The lowercased text if it is long enough to filter on
    pub fn effective_text(&self) -> Option<&str> {
        self.needle.as_deref()
    }

    /// Check if any part of the criteria restricts the output
    pub fn is_active(&self) -> bool {
        self.needle.is_some() || !self.severities.is_empty()
    }

    /// Check if a log entry matches these criteria
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if !self.severities.is_empty() && !self.severities.contains(&entry.severity()) {
            return false;
        }

        match &self.needle {
            Some(needle) => fold(entry.message()).contains(needle.as_str()),
            None => true,
        }
    }

    /// Find all match positions in a string (for highlighting).
    ///
    /// Matching runs on the same folding as [`FilterCriteria::matches`], so a
    /// row passes the filter exactly when it has a highlight. Ranges are byte
    /// offsets into `text`, widened to whole chars, sorted and disjoint.
    pub fn find_matches(&self, text: &str) -> Vec<(usize, usize)> {
        let Some(re) = &self.highlight else {
            return Vec::new();
        };

        // Original char span of every byte of the folded text
        let mut folded = String::with_capacity(text.len());
        let mut spans = Vec::with_capacity(text.len());
        for (start, c) in text.char_indices() {
            let end = start + c.len_utf8();
            for lower in c.to_lowercase() {
                folded.push(lower);
                spans.extend(std::iter::repeat_n((start, end), lower.len_utf8()));
            }
        }

        let mut ranges: Vec<(usize, usize)> = Vec::new();
        for m in re.find_iter(&folded) {
            let start = spans[m.start()].0;
            let end = spans[m.end() - 1].1;
            match ranges.last_mut() {
                // Two matches inside one expanded char
                Some(last) if start < last.1 => last.1 = last.1.max(end),
                _ => ranges.push((start, end)),
            }
        }
        ranges
    }
}

/// Lowercase one char at a time so every folded byte maps back to a char
/// of the original text.
fn fold(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

/// Criteria are equal when they select the same entries
impl PartialEq for FilterCriteria {
    fn eq(&self, other: &Self) -> bool {
        self.severities == other.severities && self.needle == other.needle
    }
}

impl Eq for FilterCriteria {}

impl std::fmt::Debug for FilterCriteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterCriteria")
            .field("text", &self.text)
            .field("effective", &self.needle)
            .field("severities", &self.severities)
            .finish()
    }
}

/// Applies filter criteria to buffer snapshots
pub struct FilterEngine;

impl FilterEngine {
    /// Keep the entries matching `criteria`, preserving order
    pub fn apply(snapshot: &[ArcLogEntry], criteria: &FilterCriteria) -> Vec<ArcLogEntry> {
        if !criteria.is_active() {
            return snapshot.to_vec();
        }

        snapshot
            .iter()
            .filter(|e| criteria.matches(e))
            .cloned()
            .collect()
    }

    /// The last `display_limit` items, in order
    pub fn window<T>(filtered: &[T], display_limit: usize) -> &[T] {
        let start = filtered.len().saturating_sub(display_limit);
        &filtered[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adbscope_types::Channel;
    use chrono::Local;
    use std::sync::Arc;

    fn entry(severity: Severity, message: &str) -> ArcLogEntry {
        Arc::new(LogEntry::new(
            severity,
            message.to_string(),
            Local::now(),
            Channel::Stdout,
        ))
    }

    fn sample() -> Vec<ArcLogEntry> {
        vec![
            entry(Severity::Error, "Unity: NullReferenceException"),
            entry(Severity::Warning, "low memory"),
            entry(Severity::Info, "scene loaded"),
            entry(Severity::Debug, "unity frame 12"),
            entry(Severity::Verbose, "gc pass"),
            entry(Severity::Unknown, "a"),
        ]
    }

    fn messages(entries: &[ArcLogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.message()).collect()
    }

    #[test]
    fn test_unfiltered_is_identity() {
        let snapshot = sample();
        let result = FilterEngine::apply(&snapshot, &FilterCriteria::new());
        assert_eq!(messages(&result), messages(&snapshot));
    }

    #[test]
    fn test_text_filter_case_insensitive() {
        let snapshot = sample();
        let criteria = FilterCriteria::new().with_text("UNITY");
        let result = FilterEngine::apply(&snapshot, &criteria);
        assert_eq!(
            messages(&result),
            vec!["Unity: NullReferenceException", "unity frame 12"]
        );
    }

    #[test]
    fn test_short_text_is_ignored() {
        let snapshot = sample();
        for text in ["a", "gc", "zz"] {
            let criteria = FilterCriteria::new().with_text(text);
            assert!(criteria.effective_text().is_none());
            assert_eq!(criteria, FilterCriteria::new());
            let result = FilterEngine::apply(&snapshot, &criteria);
            assert_eq!(result.len(), snapshot.len());
        }
    }

    #[test]
    fn test_short_text_still_applies_severities() {
        let snapshot = sample();
        let with_text = FilterCriteria::new()
            .with_severities([Severity::Error])
            .with_text("a");
        let without = FilterCriteria::new().with_severities([Severity::Error]);
        assert_eq!(
            messages(&FilterEngine::apply(&snapshot, &with_text)),
            messages(&FilterEngine::apply(&snapshot, &without))
        );
    }

    #[test]
    fn test_severity_set_is_ored() {
        let snapshot = sample();
        let criteria = FilterCriteria::new().with_severities([Severity::Error, Severity::Debug]);
        let result = FilterEngine::apply(&snapshot, &criteria);
        assert_eq!(
            messages(&result),
            vec!["Unity: NullReferenceException", "unity frame 12"]
        );
    }

    #[test]
    fn test_severity_and_text_combined() {
        let snapshot = sample();
        let criteria = FilterCriteria::new()
            .with_severities([Severity::Debug, Severity::Info])
            .with_text("unity");
        let result = FilterEngine::apply(&snapshot, &criteria);
        assert_eq!(messages(&result), vec!["unity frame 12"]);
    }

    #[test]
    fn test_toggle_severity() {
        let mut criteria = FilterCriteria::new();
        assert!(criteria.allows_all_severities());
        assert!(criteria.toggle_severity(Severity::Warning));
        assert!(criteria.is_selected(Severity::Warning));
        assert!(!criteria.toggle_severity(Severity::Warning));
        assert!(criteria.allows_all_severities());
    }

    #[test]
    fn test_push_and_pop_text() {
        let mut criteria = FilterCriteria::new();
        criteria.push_char('l');
        criteria.push_char('o');
        assert!(!criteria.is_active());
        criteria.push_char('w');
        assert_eq!(criteria.effective_text(), Some("low"));
        criteria.pop_char();
        assert!(!criteria.is_active());
        assert_eq!(criteria.text(), "lo");
    }

    #[test]
    fn test_window() {
        let items: Vec<u32> = (0..10).collect();
        assert_eq!(FilterEngine::window(&items, 3), &[7, 8, 9]);
        assert_eq!(FilterEngine::window(&items, 10), items.as_slice());
        assert_eq!(FilterEngine::window(&items, 50), items.as_slice());
        assert!(FilterEngine::window(&items, 0).is_empty());

        let empty: Vec<u32> = Vec::new();
        assert!(FilterEngine::window(&empty, 5).is_empty());
    }

    #[test]
    fn test_find_matches() {
        let criteria = FilterCriteria::new().with_text("error");
        let matches = criteria.find_matches("an Error occurred, another error here");
        assert_eq!(matches.len(), 2);

        let short = FilterCriteria::new().with_text("er");
        assert!(short.find_matches("error").is_empty());
    }

    #[test]
    fn test_highlight_agrees_with_filter_on_expanding_case() {
        // 'İ' lowercases to 'i' plus a combining dot above
        let criteria = FilterCriteria::new().with_text("İST");
        assert_eq!(criteria.effective_text(), Some("i\u{307}st"));

        let upper = entry(Severity::Info, "İSTANBUL");
        assert!(criteria.matches(&upper));
        assert_eq!(criteria.find_matches(upper.message()), vec![(0, 4)]);

        let lower = entry(Severity::Info, "i\u{307}stanbul");
        assert!(criteria.matches(&lower));
        assert_eq!(criteria.find_matches(lower.message()), vec![(0, 5)]);

        let plain = entry(Severity::Info, "istanbul");
        assert!(!criteria.matches(&plain));
        assert!(criteria.find_matches(plain.message()).is_empty());
    }

    #[test]
    fn test_highlight_ranges_are_char_aligned() {
        let criteria = FilterCriteria::new().with_text("ändern");
        let message = "Bitte ÄNDERN, nicht ändern";
        let ranges = criteria.find_matches(message);
        assert_eq!(ranges.len(), 2);
        for (start, end) in ranges {
            assert_eq!(message[start..end].to_lowercase(), "ändern");
        }
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let snapshot = vec![entry(Severity::Info, "value (x+1)"), entry(Severity::Info, "xx1")];
        let criteria = FilterCriteria::new().with_text("(x+1)");
        let result = FilterEngine::apply(&snapshot, &criteria);
        assert_eq!(messages(&result), vec!["value (x+1)"]);
        assert_eq!(criteria.find_matches("value (x+1)"), vec![(6, 11)]);
    }
}
