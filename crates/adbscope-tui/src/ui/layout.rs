use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Areas of the log viewer screen, top to bottom
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewerAreas {
    pub header: Rect,
    pub stats: Option<Rect>,
    pub filter: Rect,
    pub error: Option<Rect>,
    pub logs: Rect,
    pub status: Rect,
}

/// Layout helper for consistent screen layouts
pub struct Layout;

impl Layout {
    /// Split the log viewer: header, optional stats bar, filter bar,
    /// optional error line, logs and status bar
    pub fn log_viewer(area: Rect, show_stats: bool, show_error: bool) -> ViewerAreas {
        let mut constraints = vec![Constraint::Length(3)]; // Header
        if show_stats {
            constraints.push(Constraint::Length(3));
        }
        constraints.push(Constraint::Length(3)); // Filter bar
        if show_error {
            constraints.push(Constraint::Length(1));
        }
        constraints.push(Constraint::Min(1)); // Logs
        constraints.push(Constraint::Length(1)); // Status bar

        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let mut chunks = chunks.iter().copied();
        let mut next = || chunks.next().unwrap_or_default();

        let header = next();
        let stats = show_stats.then(&mut next);
        let filter = next();
        let error = show_error.then(&mut next);
        let logs = next();
        let status = next();

        ViewerAreas {
            header,
            stats,
            filter,
            error,
            logs,
            status,
        }
    }

    /// Rectangle of at most `width` x `height` centered in `area`
    pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width);
        let height = height.min(area.height);
        Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_viewer_layout() {
        let areas = Layout::log_viewer(Rect::new(0, 0, 80, 24), false, false);
        assert_eq!(areas.header.height, 3);
        assert!(areas.stats.is_none());
        assert_eq!(areas.filter.y, 3);
        assert!(areas.error.is_none());
        assert_eq!(areas.logs.y, 6);
        assert_eq!(areas.logs.height, 17);
        assert_eq!(areas.status.y, 23);
    }

    #[test]
    fn test_full_viewer_layout() {
        let areas = Layout::log_viewer(Rect::new(0, 0, 80, 24), true, true);
        assert_eq!(areas.stats.map(|r| r.y), Some(3));
        assert_eq!(areas.filter.y, 6);
        assert_eq!(areas.error.map(|r| r.y), Some(9));
        assert_eq!(areas.logs.y, 10);
        assert_eq!(areas.logs.height, 13);
    }

    #[test]
    fn test_centered() {
        let rect = Layout::centered(Rect::new(0, 0, 100, 40), 50, 20);
        assert_eq!(rect, Rect::new(25, 10, 50, 20));

        let clipped = Layout::centered(Rect::new(0, 0, 30, 10), 50, 20);
        assert_eq!(clipped, Rect::new(0, 0, 30, 10));
    }
}
