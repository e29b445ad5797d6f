use ratatui::{
    Frame,
    layout::{Margin, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use adbscope_logs::{Channel, FilterCriteria, IngestionSession, LogEntry, MIN_FILTER_CHARS, Severity};

use crate::app::AppState;
use crate::ui::components::{StatusBar, log_viewer_hints};
use crate::ui::{Layout, Theme};

/// Log viewer screen
pub struct LogViewerScreen;

impl LogViewerScreen {
    /// Render the last projected view of `session`
    pub fn render(frame: &mut Frame, state: &mut AppState, session: &IngestionSession) {
        let areas = Layout::log_viewer(
            frame.area(),
            state.ui_state.stats_visible,
            state.ui_state.error_message.is_some(),
        );

        Self::render_header(frame, areas.header, state, session);
        if let Some(area) = areas.stats {
            Self::render_stats_bar(frame, area, session);
        }
        Self::render_filter_bar(frame, areas.filter, state, session.criteria());
        if let Some(area) = areas.error {
            Self::render_error(frame, area, state);
        }
        Self::render_logs(frame, areas.logs, state, session);
        Self::render_status_bar(frame, areas.status, state, session);
    }

    fn render_header(frame: &mut Frame, area: Rect, state: &AppState, session: &IngestionSession) {
        let ingest = session.state();
        let view = session.view();

        let title = Line::from(vec![
            Span::styled("adbscope", Theme::title()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(state.source_label(), Theme::text()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(format!("● {:?}", ingest), Theme::ingest_state(ingest)),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(format!("{} matching logs", view.matching), Theme::text_highlight()),
        ]);

        let header = Paragraph::new(title).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );

        frame.render_widget(header, area);
    }

    fn render_stats_bar(frame: &mut Frame, area: Rect, session: &IngestionSession) {
        let buffer = session.buffer();
        let counts = buffer.severity_counts();

        let mut spans = vec![Span::raw(" ")];
        for severity in Severity::ALL {
            let count = counts.get(severity);
            if severity == Severity::Unknown && count == 0 {
                continue;
            }
            spans.push(Span::styled(
                format!("{}:", severity.code()),
                Theme::severity(severity),
            ));
            spans.push(Span::styled(format!("{} ", count), Theme::text()));
        }

        spans.push(Span::styled("│ ", Theme::text_dim()));
        spans.push(Span::styled(
            format!("Buffered:{}/{} ", counts.total(), buffer.capacity()),
            Theme::text(),
        ));
        spans.push(Span::styled(
            format!("Received:{} ", buffer.total_appended()),
            Theme::text_dim(),
        ));
        spans.push(Span::styled(
            format!("Evicted:{}", buffer.total_evicted()),
            Theme::text_dim(),
        ));

        let dropped = session.controller().lines_dropped();
        if dropped > 0 {
            spans.push(Span::styled(format!(" Skipped:{}", dropped), Theme::text_dim()));
        }

        let stats_widget = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(" Stats ", Theme::title())),
        );

        frame.render_widget(stats_widget, area);
    }

    fn render_filter_bar(frame: &mut Frame, area: Rect, state: &AppState, criteria: &FilterCriteria) {
        let editing = state.ui_state.filter_input_active;
        let mut spans = vec![Span::raw(" ")];

        // Severity switches; none lit means all pass
        for severity in Severity::ALL {
            spans.push(Span::styled(
                format!(" {} ", severity.code()),
                Theme::severity_switch(severity, criteria.is_selected(severity)),
            ));
        }
        if criteria.allows_all_severities() {
            spans.push(Span::styled(" all", Theme::text_dim()));
        }

        spans.push(Span::styled("  │ ", Theme::text_dim()));
        spans.push(Span::styled(
            if editing { "/" } else { "Text: " },
            Theme::text_highlight(),
        ));
        spans.push(Span::styled(criteria.text().to_string(), Theme::text_highlight()));
        if editing {
            spans.push(Span::styled("█", Theme::text_highlight()));
        }

        let typed = criteria.text().chars().count();
        if typed > 0 && criteria.effective_text().is_none() {
            spans.push(Span::styled(
                format!("  (needs {}+ chars)", MIN_FILTER_CHARS),
                Theme::text_dim(),
            ));
        }

        let tag = if state.tag_filter {
            format!("  │ tag: {}", state.tag)
        } else {
            "  │ tag: all".to_string()
        };
        spans.push(Span::styled(tag, Theme::text_dim()));

        let filter_bar = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(if editing {
                    Theme::border_focused()
                } else {
                    Theme::border()
                })
                .title(Span::styled(" Filter ", Theme::title())),
        );

        frame.render_widget(filter_bar, area);
    }

    fn render_error(frame: &mut Frame, area: Rect, state: &AppState) {
        if let Some(message) = &state.ui_state.error_message {
            let line = Line::from(vec![
                Span::styled(format!(" ⚠ {}", message), Theme::error()),
                Span::styled("  [Esc] dismiss", Theme::text_dim()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
        }
    }

    fn render_logs(frame: &mut Frame, area: Rect, state: &mut AppState, session: &IngestionSession) {
        let view = session.view();
        let rows = view.entries.len();

        // Visible area, accounting for borders
        let inner_height = area.height.saturating_sub(2) as usize;
        let scroll = state.clamp_scroll(rows, inner_height);

        // Borders and scrollbar
        let inner_width = area.width.saturating_sub(4) as usize;

        let criteria = session.criteria();
        let lines: Vec<Line> = view
            .entries
            .iter()
            .skip(scroll)
            .take(inner_height)
            .map(|entry| {
                format_row(
                    entry,
                    criteria,
                    state.ui_state.show_timestamps,
                    state.ui_state.show_channels,
                    inner_width,
                )
            })
            .collect();

        let title = if rows < view.matching {
            format!(" Logs (last {} of {}) ", rows, view.matching)
        } else {
            format!(" Logs ({}) ", rows)
        };

        let logs_widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(title, Theme::title())),
        );

        frame.render_widget(logs_widget, area);

        let max_scroll = rows.saturating_sub(inner_height);
        if max_scroll > 0 {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼"));
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(max_scroll)
                .position(scroll);

            frame.render_stateful_widget(
                scrollbar,
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
    }

    fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, session: &IngestionSession) {
        let follow = if state.ui_state.auto_scroll {
            "follow ▼"
        } else {
            "paused"
        };

        let status = StatusBar::new()
            .hints(log_viewer_hints(session.controller().is_running()))
            .right(Span::styled(
                format!("{} logs │ {}", session.buffer().len(), follow),
                Theme::status_bar(),
            ));

        frame.render_widget(status, area);
    }
}

/// Build one `H:mm:ss | message` row, colored by severity, with filter
/// matches highlighted and the message cut to `width` columns
fn format_row(
    entry: &LogEntry,
    criteria: &FilterCriteria,
    show_timestamps: bool,
    show_channels: bool,
    width: usize,
) -> Line<'static> {
    let style = Theme::severity(entry.severity());
    let mut spans = Vec::new();
    let mut prefix_width = 0;

    if show_channels {
        let marker = match entry.channel() {
            Channel::Stdout => "  ",
            Channel::Stderr => "! ",
        };
        spans.push(Span::styled(marker, Theme::error()));
        prefix_width += 2;
    }

    if show_timestamps {
        let prefix = format!("{} | ", entry.display_time());
        prefix_width += prefix.width();
        spans.push(Span::styled(prefix, style));
    }

    let message = truncate_to_width(entry.message(), width.saturating_sub(prefix_width));

    let mut last_end = 0;
    for (start, end) in criteria.find_matches(&message) {
        if start > last_end {
            spans.push(Span::styled(message[last_end..start].to_string(), style));
        }
        spans.push(Span::styled(
            message[start..end].to_string(),
            Theme::match_highlight(),
        ));
        last_end = end;
    }
    if last_end < message.len() {
        spans.push(Span::styled(message[last_end..].to_string(), style));
    }

    Line::from(spans)
}

/// Cut `text` to at most `max` display columns, ending with "..." when cut
fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }

    let budget = max.saturating_sub(3);
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str(&"..."[..max.min(3)]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use adbscope_adb::{LogSource, SpawnedSource};
    use adbscope_logs::SessionConfig;
    use chrono::{Local, TimeZone};
    use futures::FutureExt;
    use futures::future::BoxFuture;
    use ratatui::{Terminal, backend::TestBackend};
    use std::io;
    use std::sync::Arc;

    struct NoDevice;

    impl LogSource for NoDevice {
        fn spawn(&self, _args: &[String]) -> io::Result<SpawnedSource> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no device"))
        }

        fn run(&self, _args: &[String]) -> BoxFuture<'static, io::Result<()>> {
            async { Ok(()) }.boxed()
        }
    }

    fn entry(severity: Severity, message: &str, channel: Channel) -> LogEntry {
        let at = Local.with_ymd_and_hms(2024, 3, 1, 9, 4, 5).unwrap();
        LogEntry::new(severity, message.to_string(), at, channel)
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_row_format() {
        let entry = entry(Severity::Error, "boom", Channel::Stdout);
        let line = format_row(&entry, &FilterCriteria::new(), true, false, 80);
        assert_eq!(text(&line), "9:04:05 | boom");
        assert!(line.spans.iter().all(|s| s.style.fg == Some(Severity::Error.color())));

        let bare = format_row(&entry, &FilterCriteria::new(), false, false, 80);
        assert_eq!(text(&bare), "boom");
    }

    #[test]
    fn test_row_channel_marker() {
        let entry = entry(Severity::Warning, "careful", Channel::Stderr);
        let line = format_row(&entry, &FilterCriteria::new(), false, true, 80);
        assert_eq!(text(&line), "! careful");
    }

    #[test]
    fn test_row_highlights_matches() {
        let entry = entry(Severity::Info, "Scene loaded scene", Channel::Stdout);
        let criteria = FilterCriteria::new().with_text("scene");
        let line = format_row(&entry, &criteria, false, false, 80);

        let highlighted: Vec<&str> = line
            .spans
            .iter()
            .filter(|s| s.style == Theme::match_highlight())
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(highlighted, vec!["Scene", "scene"]);
        assert_eq!(text(&line), "Scene loaded scene");
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("0123456789abc", 10), "0123456...");
        // Wide characters count two columns each
        assert_eq!(truncate_to_width("日本語のログ", 7), "日本...");
        assert_eq!(truncate_to_width("abcdef", 2), "..");
    }

    #[test]
    fn test_screen_renders_view() {
        let mut session = IngestionSession::new(SessionConfig::default(), Arc::new(NoDevice)).unwrap();
        session.buffer().append(entry(Severity::Error, "boom", Channel::Stdout));
        session.buffer().append(entry(Severity::Info, "ok", Channel::Stdout));
        session.refresh_view();

        let mut state = AppState::new("Unity", true, false);
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|frame| LogViewerScreen::render(frame, &mut state, &session))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");

        assert!(screen.contains("logcat -s Unity"));
        assert!(screen.contains("2 matching logs"));
        assert!(screen.contains("9:04:05 | boom"));
        assert!(screen.contains("9:04:05 | ok"));
    }
}
