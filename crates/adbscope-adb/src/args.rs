/// Tag the stream is restricted to when tag filtering is on
pub const DEFAULT_TAG: &str = "Unity";

/// Argument builder for `adb logcat` invocations
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogcatArgs {
    tag: Option<String>,
}

impl LogcatArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict output to a single source tag (`-s <tag>`)
    pub fn only_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.tag = if tag.is_empty() { None } else { Some(tag) };
        self
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Arguments for the main streaming invocation
    pub fn stream(&self) -> Vec<String> {
        let mut args = vec!["logcat".to_string()];
        if let Some(tag) = &self.tag {
            args.push("-s".to_string());
            args.push(tag.clone());
        }
        args
    }

    /// Arguments for the one-shot device log clear
    pub fn clear() -> Vec<String> {
        vec!["logcat".to_string(), "-c".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_args_without_tag() {
        assert_eq!(LogcatArgs::new().stream(), vec!["logcat"]);
    }

    #[test]
    fn test_stream_args_with_tag() {
        let args = LogcatArgs::new().only_tag(DEFAULT_TAG);
        assert_eq!(args.stream(), vec!["logcat", "-s", "Unity"]);
        assert_eq!(args.tag(), Some("Unity"));
    }

    #[test]
    fn test_empty_tag_disables_filter() {
        let args = LogcatArgs::new().only_tag("");
        assert_eq!(args.tag(), None);
        assert_eq!(args.stream(), vec!["logcat"]);
    }

    #[test]
    fn test_clear_args() {
        assert_eq!(LogcatArgs::clear(), vec!["logcat", "-c"]);
    }
}
