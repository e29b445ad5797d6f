use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use adbscope_adb::DEFAULT_TAG;
use adbscope_logs::SessionConfig;

/// adbscope - A terminal UI for watching Android device logs
#[derive(Parser, Debug, Default)]
#[command(name = "adbscope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the adb executable
    #[arg(long)]
    pub adb: Option<PathBuf>,

    /// Android SDK root; adb is looked up in its platform-tools
    #[arg(long)]
    pub sdk_root: Option<PathBuf>,

    /// Maximum number of buffered log entries
    #[arg(long)]
    pub buffer_size: Option<usize>,

    /// Maximum number of entries shown
    #[arg(long)]
    pub display_limit: Option<usize>,

    /// Entries dropped below capacity when the buffer is trimmed
    #[arg(long)]
    pub eviction_slack: Option<usize>,

    /// Only stream this logcat tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Stream every tag instead of only --tag
    #[arg(long)]
    pub all_tags: bool,

    /// Clear the device log before streaming
    #[arg(long)]
    pub clear: bool,

    /// Do not start streaming on launch
    #[arg(long)]
    pub no_autostart: bool,

    /// Write diagnostics to this file (the terminal is owned by the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub adb: Option<PathBuf>,
    pub sdk_root: Option<PathBuf>,
    pub buffer_size: usize,
    pub display_limit: usize,
    pub eviction_slack: usize,
    pub tag: String,
    pub tag_filter: bool,
    pub clear_on_start: bool,
    pub autostart: bool,
    pub tick_rate_ms: u64,
    pub stop_timeout_ms: u64,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            adb: None,
            sdk_root: None,
            buffer_size: 1000,
            display_limit: 150,
            eviction_slack: 1,
            tag: DEFAULT_TAG.to_string(),
            tag_filter: true,
            clear_on_start: false,
            autostart: true,
            tick_rate_ms: 100,
            stop_timeout_ms: 3000,
            log_file: None,
        }
    }
}

impl Config {
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            capacity: self.buffer_size,
            eviction_slack: self.eviction_slack,
            display_limit: self.display_limit,
            stop_timeout: Duration::from_millis(self.stop_timeout_ms),
        }
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }

    /// Apply CLI overrides
    fn apply(&mut self, cli: &Cli) {
        if let Some(adb) = &cli.adb {
            self.adb = Some(adb.clone());
        }
        if let Some(sdk_root) = &cli.sdk_root {
            self.sdk_root = Some(sdk_root.clone());
        }
        if let Some(size) = cli.buffer_size {
            self.buffer_size = size;
        }
        if let Some(limit) = cli.display_limit {
            self.display_limit = limit;
        }
        if let Some(slack) = cli.eviction_slack {
            self.eviction_slack = slack;
        }
        if let Some(tag) = &cli.tag {
            self.tag = tag.clone();
            self.tag_filter = true;
        }
        if cli.all_tags {
            self.tag_filter = false;
        }
        if cli.clear {
            self.clear_on_start = true;
        }
        if cli.no_autostart {
            self.autostart = false;
        }
        if let Some(path) = &cli.log_file {
            self.log_file = Some(path.clone());
        }
    }
}

/// Defaults, overlaid by the config file (if given), overlaid by the CLI
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            parse_config(&content)?
        }
        None => Config::default(),
    };

    config.apply(cli);
    Ok(config)
}

fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).context("Failed to parse config file")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = load_config(&Cli::default()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.tag, "Unity");
        assert!(config.tag_filter);
        assert!(config.autostart);
        assert_eq!(config.session(), SessionConfig::default());
        assert_eq!(config.tick_rate(), Duration::from_millis(100));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse_config("buffer_size = 5000\ntag = \"MyGame\"\n").unwrap();
        assert_eq!(config.buffer_size, 5000);
        assert_eq!(config.tag, "MyGame");
        assert_eq!(config.display_limit, 150);
        assert_eq!(config.stop_timeout_ms, 3000);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        assert!(parse_config("buffer_size = \"lots\"").is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/adbscope.toml")),
            ..Cli::default()
        };
        let err = load_config(&cli).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config = parse_config("display_limit = 40\ntag_filter = true\n").unwrap();
        let cli = Cli::parse_from([
            "adbscope",
            "--display-limit",
            "80",
            "--all-tags",
            "--clear",
            "--no-autostart",
        ]);
        config.apply(&cli);

        assert_eq!(config.display_limit, 80);
        assert!(!config.tag_filter);
        assert!(config.clear_on_start);
        assert!(!config.autostart);
    }

    #[test]
    fn test_tag_flag_enables_tag_filter() {
        let mut config = parse_config("tag_filter = false\n").unwrap();
        config.apply(&Cli::parse_from(["adbscope", "--tag", "Game"]));
        assert_eq!(config.tag, "Game");
        assert!(config.tag_filter);
    }
}
