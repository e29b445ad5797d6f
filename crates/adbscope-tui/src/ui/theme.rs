use ratatui::style::{Color, Modifier, Style};

use adbscope_logs::{IngestState, Severity};

/// Color theme for the application
pub struct Theme;

impl Theme {
    // Base colors
    pub const FG: Color = Color::White;
    pub const FG_DIM: Color = Color::DarkGray;

    // Accent colors
    pub const PRIMARY: Color = Color::Cyan;
    pub const HIGHLIGHT: Color = Color::Yellow;

    // Status colors
    pub const SUCCESS: Color = Color::Green;
    pub const WARNING: Color = Color::Yellow;
    pub const ERROR: Color = Color::Red;

    pub fn border() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Self::HIGHLIGHT)
    }

    // Text styles
    pub fn title() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text() -> Style {
        Style::default().fg(Self::FG)
    }

    pub fn text_dim() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    pub fn text_highlight() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Row color for a log entry
    pub fn severity(severity: Severity) -> Style {
        Style::default().fg(severity.color())
    }

    /// Label of a severity switch, lit when selected
    pub fn severity_switch(severity: Severity, selected: bool) -> Style {
        if selected {
            Style::default()
                .fg(Color::Black)
                .bg(severity.color())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(severity.color())
        }
    }

    /// Filter text matches inside a row
    pub fn match_highlight() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn ingest_state(state: IngestState) -> Style {
        let color = match state {
            IngestState::Running => Self::SUCCESS,
            IngestState::Starting | IngestState::Stopping => Self::WARNING,
            IngestState::Idle => Self::FG_DIM,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    // Status bar
    pub fn status_bar() -> Style {
        Style::default().fg(Self::FG).bg(Color::DarkGray)
    }

    pub fn status_bar_key() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    }

    // Error
    pub fn error() -> Style {
        Style::default()
            .fg(Self::ERROR)
            .add_modifier(Modifier::BOLD)
    }
}
