use adbscope_logs::Severity;

/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,

    // Ingestion
    StartIngestion,
    StopIngestion,
    ToggleIngestion,
    ClearLogs,
    ToggleTagFilter,

    // Severity switches
    ToggleSeverity(Severity),
    ShowAllSeverities,

    // Text filter
    OpenFilter,
    CloseFilter,
    FilterInput(char),
    FilterBackspace,
    FilterClear,
    ClearFilter,

    // Log viewer
    ScrollUp(usize),
    ScrollDown(usize),
    ScrollToTop,
    ScrollToBottom,
    PageUp,
    PageDown,
    ToggleAutoScroll,
    ToggleTimestamps,
    ToggleChannels,
    ToggleStats,
    ToggleHelp,

    // Error handling
    ShowError(String),
    DismissError,

    // Tick (for periodic updates)
    Tick,

    // Render request
    Render,
}
