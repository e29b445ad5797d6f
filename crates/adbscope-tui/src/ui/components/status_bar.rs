use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use crate::ui::Theme;

/// Status bar showing keyboard shortcuts on the left and state on the right
pub struct StatusBar<'a> {
    hints: Vec<(&'a str, &'a str)>,
    right: Vec<Span<'a>>,
}

impl<'a> StatusBar<'a> {
    pub fn new() -> Self {
        Self {
            hints: Vec::new(),
            right: Vec::new(),
        }
    }

    /// Add keyboard hints as (key, description) pairs
    pub fn hints<I>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.hints = hints.into_iter().collect();
        self
    }

    /// Append a span to the right-aligned section
    pub fn right(mut self, span: Span<'a>) -> Self {
        self.right.push(span);
        self
    }
}

impl Default for StatusBar<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Theme::status_bar());

        let mut spans = Vec::new();
        for (i, (key, desc)) in self.hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" ", Theme::status_bar()));
            }
            spans.push(Span::styled(format!("[{}]", key), Theme::status_bar_key()));
            spans.push(Span::styled(desc.to_string(), Theme::status_bar()));
        }
        let left = Line::from(spans);
        let left_width = left.width() as u16;
        buf.set_line(area.x + 1, area.y, &left, area.width.saturating_sub(2));

        // Right section is dropped rather than drawn over the hints
        let right = Line::from(self.right);
        let right_width = right
            .spans
            .iter()
            .map(|s| s.content.width())
            .sum::<usize>() as u16;
        let right_x = area.x + area.width.saturating_sub(right_width + 1);
        if right_width > 0 && right_x > area.x + left_width + 2 {
            buf.set_line(right_x, area.y, &right, right_width);
        }
    }
}

/// Hints for the log viewer; the first one reflects the ingestion state
pub fn log_viewer_hints(running: bool) -> Vec<(&'static str, &'static str)> {
    let ingest = if running { ("x", "Stop") } else { ("r", "Start") };
    vec![
        ingest,
        ("c", "Clear"),
        ("/", "Filter"),
        ("E/W/I/D/V", "Levels"),
        ("u", "Tag"),
        ("?", "Help"),
        ("q", "Quit"),
    ]
}
