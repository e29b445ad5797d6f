use chrono::{DateTime, Local};

use adbscope_types::{Channel, LogEntry, Severity};

/// Parser turning raw logcat lines into log entries
pub struct LineParser;

impl LineParser {
    /// Parse a raw line, stamping it with the current time.
    ///
    /// Returns `None` for lines of two characters or fewer: they cannot hold a
    /// type marker, a separator and a message.
    pub fn parse(raw: &str, channel: Channel) -> Option<LogEntry> {
        Self::parse_at(raw, channel, Local::now())
    }

    /// Parse a raw line with an explicit timestamp
    pub fn parse_at(raw: &str, channel: Channel, at: DateTime<Local>) -> Option<LogEntry> {
        let mut chars = raw.char_indices();

        // Character 0 is the type marker, character 1 the separator
        let (_, code) = chars.next()?;
        chars.next()?;
        let (message_start, _) = chars.next()?;

        Some(LogEntry::new(
            Severity::from_code(code),
            raw[message_start..].to_string(),
            at,
            channel,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_severities_and_messages() {
        let lines = ["E boom", "W careful", "I ok"];
        let entries: Vec<LogEntry> = lines
            .iter()
            .filter_map(|l| LineParser::parse(l, Channel::Stdout))
            .collect();

        let severities: Vec<Severity> = entries.iter().map(|e| e.severity()).collect();
        assert_eq!(
            severities,
            vec![Severity::Error, Severity::Warning, Severity::Info]
        );

        let messages: Vec<&str> = entries.iter().map(|e| e.message()).collect();
        assert_eq!(messages, vec!["boom", "careful", "ok"]);
    }

    #[test]
    fn test_rejects_short_lines() {
        assert!(LineParser::parse("", Channel::Stdout).is_none());
        assert!(LineParser::parse("X", Channel::Stdout).is_none());
        assert!(LineParser::parse("E/", Channel::Stderr).is_none());
    }

    #[test]
    fn test_three_chars_is_shortest_entry() {
        let entry = LineParser::parse("D x", Channel::Stdout).unwrap();
        assert_eq!(entry.severity(), Severity::Debug);
        assert_eq!(entry.message(), "x");
    }

    #[test]
    fn test_unknown_marker_is_kept() {
        let entry = LineParser::parse("F/libc: fatal signal", Channel::Stderr).unwrap();
        assert_eq!(entry.severity(), Severity::Unknown);
        assert_eq!(entry.message(), "libc: fatal signal");
        assert_eq!(entry.channel(), Channel::Stderr);
    }

    #[test]
    fn test_message_is_verbatim() {
        let entry = LineParser::parse("I/Unity   ( 1234):   padded  ", Channel::Stdout).unwrap();
        assert_eq!(entry.message(), "Unity   ( 1234):   padded  ");
    }

    #[test]
    fn test_multibyte_prefix_no_panic() {
        // Separator is a 3-byte character
        let entry = LineParser::parse("W─héllo", Channel::Stdout).unwrap();
        assert_eq!(entry.severity(), Severity::Warning);
        assert_eq!(entry.message(), "héllo");

        // Two multibyte characters are still too short
        assert!(LineParser::parse("é─", Channel::Stdout).is_none());
    }

    #[test]
    fn test_parse_at_uses_given_time() {
        let at = Local::now();
        let entry = LineParser::parse_at("V verbose", Channel::Stdout, at).unwrap();
        assert_eq!(entry.created_at(), at);
        assert_eq!(entry.severity(), Severity::Verbose);
    }
}
