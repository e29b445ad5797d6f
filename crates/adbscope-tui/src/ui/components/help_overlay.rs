use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::Layout;

/// Help overlay showing keybindings
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame) {
        let lines = Self::lines();
        let area = frame.area();
        let popup_area = Layout::centered(
            area,
            52.min(area.width.saturating_sub(4)),
            (lines.len() as u16 + 2).min(area.height.saturating_sub(2)),
        );

        frame.render_widget(Clear, popup_area);

        let help_widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(
                    " Help ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        );

        frame.render_widget(help_widget, popup_area);
    }

    fn lines() -> Vec<Line<'static>> {
        vec![
            Self::section("Capture"),
            Self::key_line("r", "Start logcat"),
            Self::key_line("x", "Stop logcat"),
            Self::key_line("Space", "Start/stop"),
            Self::key_line("c", "Clear captured logs"),
            Self::key_line("u", "Toggle tag filter (while stopped)"),
            Line::from(""),
            Self::section("Filter"),
            Self::key_line("E W I D V", "Toggle error/warn/info/debug/verbose"),
            Self::key_line("U", "Toggle unknown type"),
            Self::key_line("A", "Show all levels"),
            Self::key_line("/", "Edit text filter (3+ chars)"),
            Self::key_line("n", "Clear text filter"),
            Line::from(""),
            Self::section("Navigation"),
            Self::key_line("j/k", "Scroll down/up"),
            Self::key_line("Ctrl+d/u", "Page down/up"),
            Self::key_line("g/G", "Go to top/bottom"),
            Self::key_line("f", "Toggle follow mode"),
            Line::from(""),
            Self::section("Display"),
            Self::key_line("t", "Toggle timestamps"),
            Self::key_line("o", "Mark stderr lines"),
            Self::key_line("s", "Toggle stats bar"),
            Self::key_line("Esc", "Dismiss message"),
            Self::key_line("?", "Toggle this help"),
            Self::key_line("q", "Quit"),
        ]
    }

    fn section(title: &'static str) -> Line<'static> {
        Line::from(Span::styled(title, Style::default().fg(Color::Yellow)))
    }

    fn key_line(key: &'static str, desc: &'static str) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!(" {:>10}", key), Style::default().fg(Color::Green)),
            Span::styled(format!("  {}", desc), Style::default().fg(Color::White)),
        ])
    }
}
