use adbscope_types::ArcLogEntry;

use crate::buffer::LogBuffer;
use crate::filter::{FilterCriteria, FilterEngine};

/// What the UI renders: the newest matching entries plus counts
#[derive(Clone, Debug, Default)]
pub struct LogView {
    /// Last `display_limit` matching entries, oldest first
    pub entries: Vec<ArcLogEntry>,

    /// Entries matching the criteria before windowing
    pub matching: usize,

    /// Entries in the buffer
    pub total: usize,
}

/// Projects buffer contents through filter criteria into a bounded view.
///
/// The projection is cached and only recomputed when the buffer revision or
/// the criteria change.
#[derive(Debug)]
pub struct ViewProjector {
    display_limit: usize,
    view: LogView,
    cached_revision: Option<u64>,
    cached_criteria: Option<FilterCriteria>,
}

impl ViewProjector {
    pub fn new(display_limit: usize) -> Self {
        Self {
            display_limit: display_limit.max(1),
            view: LogView::default(),
            cached_revision: None,
            cached_criteria: None,
        }
    }

    pub fn display_limit(&self) -> usize {
        self.display_limit
    }

    /// Current view of `buffer` under `criteria`
    pub fn project(&mut self, buffer: &LogBuffer, criteria: &FilterCriteria) -> &LogView {
        let revision = buffer.revision();
        let fresh = self.cached_revision == Some(revision)
            && self.cached_criteria.as_ref() == Some(criteria);
        if fresh {
            return &self.view;
        }

        if criteria.is_active() {
            let snapshot = buffer.versioned_snapshot();
            let filtered = FilterEngine::apply(&snapshot.entries, criteria);
            self.view = LogView {
                entries: FilterEngine::window(&filtered, self.display_limit).to_vec(),
                matching: filtered.len(),
                total: snapshot.buffered,
            };
            self.cached_revision = Some(snapshot.revision);
        } else {
            // Nothing to filter: copy only the tail
            let snapshot = buffer.versioned_tail(self.display_limit);
            self.view = LogView {
                entries: snapshot.entries,
                matching: snapshot.buffered,
                total: snapshot.buffered,
            };
            self.cached_revision = Some(snapshot.revision);
        }
        self.cached_criteria = Some(criteria.clone());

        &self.view
    }

    /// The last projected view, without checking for changes
    pub fn view(&self) -> &LogView {
        &self.view
    }

    /// Force the next `project` call to recompute
    pub fn invalidate(&mut self) {
        self.cached_revision = None;
        self.cached_criteria = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adbscope_types::{Channel, LogEntry, Severity};
    use chrono::Local;
    use std::sync::Arc;

    fn fill(buffer: &LogBuffer, count: usize) {
        for i in 0..count {
            let severity = if i % 2 == 0 {
                Severity::Info
            } else {
                Severity::Error
            };
            buffer.append(LogEntry::new(
                severity,
                format!("line {}", i),
                Local::now(),
                Channel::Stdout,
            ));
        }
    }

    fn messages(view: &LogView) -> Vec<&str> {
        view.entries.iter().map(|e| e.message()).collect()
    }

    #[test]
    fn test_unfiltered_view_is_tail() {
        let buffer = LogBuffer::new(100);
        fill(&buffer, 10);
        let mut projector = ViewProjector::new(3);

        let view = projector.project(&buffer, &FilterCriteria::new());
        assert_eq!(messages(view), vec!["line 7", "line 8", "line 9"]);
        assert_eq!(view.matching, 10);
        assert_eq!(view.total, 10);
    }

    #[test]
    fn test_filtered_view_counts_before_window() {
        let buffer = LogBuffer::new(100);
        fill(&buffer, 10);
        let mut projector = ViewProjector::new(2);
        let criteria = FilterCriteria::new().with_severities([Severity::Error]);

        let view = projector.project(&buffer, &criteria);
        assert_eq!(messages(view), vec!["line 7", "line 9"]);
        assert_eq!(view.matching, 5);
        assert_eq!(view.total, 10);
    }

    #[test]
    fn test_view_is_cached_until_revision_changes() {
        let buffer = LogBuffer::new(100);
        fill(&buffer, 4);
        let mut projector = ViewProjector::new(10);
        let criteria = FilterCriteria::new();

        let first = projector.project(&buffer, &criteria).entries.clone();
        let second = projector.project(&buffer, &criteria).entries.clone();
        assert!(first.iter().zip(&second).all(|(a, b)| Arc::ptr_eq(a, b)));

        fill(&buffer, 1);
        assert_eq!(projector.project(&buffer, &criteria).entries.len(), 5);

        buffer.clear();
        assert!(projector.project(&buffer, &criteria).entries.is_empty());
    }

    #[test]
    fn test_view_follows_criteria_changes() {
        let buffer = LogBuffer::new(100);
        fill(&buffer, 6);
        let mut projector = ViewProjector::new(10);
        let mut criteria = FilterCriteria::new();

        assert_eq!(projector.project(&buffer, &criteria).entries.len(), 6);

        criteria.toggle_severity(Severity::Info);
        assert_eq!(projector.project(&buffer, &criteria).entries.len(), 3);

        criteria.set_text("line 4");
        assert_eq!(messages(projector.project(&buffer, &criteria)), vec!["line 4"]);

        criteria.clear();
        assert_eq!(projector.project(&buffer, &criteria).entries.len(), 6);
    }

    #[test]
    fn test_invalidate() {
        let buffer = LogBuffer::new(100);
        let mut projector = ViewProjector::new(10);
        fill(&buffer, 2);
        projector.project(&buffer, &FilterCriteria::new());

        projector.invalidate();
        assert_eq!(projector.project(&buffer, &FilterCriteria::new()).total, 2);
        assert_eq!(projector.view().total, 2);
    }
}
