use adbscope_logs::{LogcatArgs, StartOptions};

/// Rows moved by a page scroll
pub const PAGE_SIZE: usize = 20;

/// UI-specific transient state
pub struct UiState {
    /// Is the text filter input focused?
    pub filter_input_active: bool,

    /// Is help overlay visible?
    pub help_visible: bool,

    /// Show statistics bar?
    pub stats_visible: bool,

    /// Error or notice to display (if any)
    pub error_message: Option<String>,

    /// First visible row in the log view
    pub log_scroll: usize,

    /// Auto-scroll enabled (follow mode)?
    pub auto_scroll: bool,

    /// Show `H:mm:ss |` before each message?
    pub show_timestamps: bool,

    /// Mark rows that arrived on stderr?
    pub show_channels: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            filter_input_active: false,
            help_visible: false,
            stats_visible: false,
            error_message: None,
            log_scroll: 0,
            auto_scroll: true,
            show_timestamps: true,
            show_channels: false,
        }
    }
}

/// Global application state
pub struct AppState {
    /// Tag the stream is restricted to when the tag filter is on
    pub tag: String,

    /// Pass `-s <tag>` to logcat on the next start?
    pub tag_filter: bool,

    /// Clear the device log before each start?
    pub clear_on_start: bool,

    /// UI state
    pub ui_state: UiState,

    /// Whether app should quit
    pub should_quit: bool,

    /// Dirty flag for rendering - only render when true
    pub render_dirty: bool,

    /// Buffer revision at the last render, for change detection
    pub last_revision: u64,
}

impl AppState {
    pub fn new(tag: impl Into<String>, tag_filter: bool, clear_on_start: bool) -> Self {
        Self {
            tag: tag.into(),
            tag_filter,
            clear_on_start,
            ui_state: UiState::default(),
            should_quit: false,
            render_dirty: true, // Start dirty to ensure initial render
            last_revision: 0,
        }
    }

    /// Options for the next ingestion start
    pub fn start_options(&self) -> StartOptions {
        let args = if self.tag_filter {
            LogcatArgs::new().only_tag(self.tag.as_str())
        } else {
            LogcatArgs::new()
        };

        StartOptions {
            args,
            clear_device_log: self.clear_on_start,
        }
    }

    /// Text describing what the next start will stream
    pub fn source_label(&self) -> String {
        self.start_options().args.stream().join(" ")
    }

    pub fn toggle_tag_filter(&mut self) {
        self.tag_filter = !self.tag_filter;
    }

    /// Show an error message
    pub fn show_error(&mut self, msg: impl Into<String>) {
        self.ui_state.error_message = Some(msg.into());
    }

    /// Dismiss the error message
    pub fn dismiss_error(&mut self) {
        self.ui_state.error_message = None;
    }

    pub fn open_filter(&mut self) {
        self.ui_state.filter_input_active = true;
    }

    pub fn close_filter(&mut self) {
        self.ui_state.filter_input_active = false;
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.ui_state.auto_scroll = false;
        self.ui_state.log_scroll = self.ui_state.log_scroll.saturating_sub(n);
    }

    /// Not capped here; `clamp_scroll` bounds it at render time
    pub fn scroll_down(&mut self, n: usize) {
        self.ui_state.auto_scroll = false;
        self.ui_state.log_scroll = self.ui_state.log_scroll.saturating_add(n);
    }

    pub fn scroll_to_top(&mut self) {
        self.ui_state.auto_scroll = false;
        self.ui_state.log_scroll = 0;
    }

    /// Jump to the newest row and keep following
    pub fn scroll_to_bottom(&mut self) {
        self.ui_state.auto_scroll = true;
        self.ui_state.log_scroll = usize::MAX;
    }

    pub fn toggle_auto_scroll(&mut self) {
        self.ui_state.auto_scroll = !self.ui_state.auto_scroll;
    }

    /// Bound the scroll position for `rows` entries in a viewport of `height`
    /// rows and return it. Follow mode pins the view to the newest row.
    pub fn clamp_scroll(&mut self, rows: usize, height: usize) -> usize {
        let max_scroll = rows.saturating_sub(height);
        if self.ui_state.auto_scroll || self.ui_state.log_scroll > max_scroll {
            self.ui_state.log_scroll = max_scroll;
        }
        self.ui_state.log_scroll
    }

    /// Forget the scroll position after the rows were replaced
    pub fn reset_scroll(&mut self) {
        self.ui_state.log_scroll = 0;
        self.ui_state.auto_scroll = true;
    }
}
