//! Shared types for adbscope
//!
//! This crate contains data structures used across multiple adbscope crates.

use chrono::{DateTime, Local};
use ratatui::style::Color;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Log Types
// ============================================================================

/// Log severity, taken from the leading character of a logcat line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Verbose,
    Debug,
    Info,
    Warning,
    Error,
    Unknown,
}

impl Severity {
    /// Every severity, in toggle order
    pub const ALL: [Severity; 6] = [
        Self::Error,
        Self::Warning,
        Self::Info,
        Self::Debug,
        Self::Verbose,
        Self::Unknown,
    ];

    /// Classify a logcat type character. Unrecognized markers become `Unknown`.
    pub fn from_code(code: char) -> Self {
        match code {
            'V' => Self::Verbose,
            'D' => Self::Debug,
            'I' => Self::Info,
            'W' => Self::Warning,
            'E' => Self::Error,
            _ => Self::Unknown,
        }
    }

    /// The logcat type character
    pub fn code(&self) -> char {
        match self {
            Self::Verbose => 'V',
            Self::Debug => 'D',
            Self::Info => 'I',
            Self::Warning => 'W',
            Self::Error => 'E',
            Self::Unknown => '?',
        }
    }

    /// Get display color for this severity
    pub fn color(&self) -> Color {
        match self {
            Self::Error => Color::Red,
            Self::Warning => Color::Yellow,
            Self::Info => Color::Green,
            Self::Debug => Color::Blue,
            Self::Verbose | Self::Unknown => Color::Gray,
        }
    }

    /// Full display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Verbose => "Verbose",
            Self::Debug => "Debug",
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Output channel of the log source a line arrived on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Stdout,
    Stderr,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

/// A single log entry. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    severity: Severity,
    message: String,
    created_at: DateTime<Local>,
    channel: Channel,
}

impl LogEntry {
    pub fn new(
        severity: Severity,
        message: String,
        created_at: DateTime<Local>,
        channel: Channel,
    ) -> Self {
        Self {
            severity,
            message,
            created_at,
            channel,
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Wall-clock time the line was parsed
    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Timestamp as `H:mm:ss` (no leading zero on the hour)
    pub fn display_time(&self) -> String {
        self.created_at.format("%-H:%M:%S").to_string()
    }
}

/// Shared handle to a buffered entry; clones are a reference count bump
pub type ArcLogEntry = Arc<LogEntry>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_severity_from_code() {
        assert_eq!(Severity::from_code('E'), Severity::Error);
        assert_eq!(Severity::from_code('W'), Severity::Warning);
        assert_eq!(Severity::from_code('I'), Severity::Info);
        assert_eq!(Severity::from_code('D'), Severity::Debug);
        assert_eq!(Severity::from_code('V'), Severity::Verbose);
        assert_eq!(Severity::from_code('F'), Severity::Unknown);
        assert_eq!(Severity::from_code('e'), Severity::Unknown);
    }

    #[test]
    fn test_severity_colors() {
        assert_eq!(Severity::Error.color(), Color::Red);
        assert_eq!(Severity::Warning.color(), Color::Yellow);
        assert_eq!(Severity::Info.color(), Color::Green);
        assert_eq!(Severity::Debug.color(), Color::Blue);
        assert_eq!(Severity::Verbose.color(), Severity::Unknown.color());
    }

    #[test]
    fn test_display_time_has_no_leading_hour_zero() {
        let at = Local.with_ymd_and_hms(2024, 3, 1, 7, 5, 9).unwrap();
        let entry = LogEntry::new(Severity::Info, "ok".to_string(), at, Channel::Stdout);
        assert_eq!(entry.display_time(), "7:05:09");

        let at = Local.with_ymd_and_hms(2024, 3, 1, 17, 45, 0).unwrap();
        let entry = LogEntry::new(Severity::Info, "ok".to_string(), at, Channel::Stdout);
        assert_eq!(entry.display_time(), "17:45:00");
    }
}
