use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use adbscope_logs::Severity;

use crate::app::Action;

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    LogViewer,
    FilterInput,
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings
        let mut global = HashMap::new();
        global.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        bindings.insert(KeyContext::Global, global);

        let mut log_viewer = HashMap::new();
        // Ingestion
        log_viewer.insert(KeyBinding::new(KeyCode::Char('r')), Action::StartIngestion);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('x')), Action::StopIngestion);
        log_viewer.insert(KeyBinding::new(KeyCode::Char(' ')), Action::ToggleIngestion);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('c')), Action::ClearLogs);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('u')), Action::ToggleTagFilter);
        // Severity switches (shift + logcat letter)
        for severity in Severity::ALL {
            let key = match severity {
                Severity::Unknown => 'U',
                other => other.code(),
            };
            log_viewer.insert(
                KeyBinding::shift(KeyCode::Char(key)),
                Action::ToggleSeverity(severity),
            );
        }
        log_viewer.insert(KeyBinding::shift(KeyCode::Char('A')), Action::ShowAllSeverities);
        // Text filter
        log_viewer.insert(KeyBinding::new(KeyCode::Char('/')), Action::OpenFilter);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('n')), Action::ClearFilter);
        // Line navigation
        log_viewer.insert(KeyBinding::new(KeyCode::Char('j')), Action::ScrollDown(1));
        log_viewer.insert(KeyBinding::new(KeyCode::Down), Action::ScrollDown(1));
        log_viewer.insert(KeyBinding::new(KeyCode::Char('k')), Action::ScrollUp(1));
        log_viewer.insert(KeyBinding::new(KeyCode::Up), Action::ScrollUp(1));
        // Page navigation (less-style)
        log_viewer.insert(KeyBinding::ctrl(KeyCode::Char('d')), Action::PageDown);
        log_viewer.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::PageUp);
        log_viewer.insert(KeyBinding::new(KeyCode::PageDown), Action::PageDown);
        log_viewer.insert(KeyBinding::new(KeyCode::PageUp), Action::PageUp);
        // Top/bottom navigation
        log_viewer.insert(KeyBinding::new(KeyCode::Char('g')), Action::ScrollToTop);
        log_viewer.insert(KeyBinding::shift(KeyCode::Char('G')), Action::ScrollToBottom);
        log_viewer.insert(KeyBinding::new(KeyCode::Home), Action::ScrollToTop);
        log_viewer.insert(KeyBinding::new(KeyCode::End), Action::ScrollToBottom);
        // Display
        log_viewer.insert(KeyBinding::new(KeyCode::Char('f')), Action::ToggleAutoScroll);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('t')), Action::ToggleTimestamps);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('o')), Action::ToggleChannels);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('s')), Action::ToggleStats);
        log_viewer.insert(KeyBinding::new(KeyCode::Esc), Action::DismissError);
        bindings.insert(KeyContext::LogViewer, log_viewer);

        // Filter input bindings (when filter bar is focused)
        let mut filter_input = HashMap::new();
        filter_input.insert(KeyBinding::new(KeyCode::Enter), Action::CloseFilter);
        filter_input.insert(KeyBinding::new(KeyCode::Esc), Action::CloseFilter);
        filter_input.insert(KeyBinding::new(KeyCode::Backspace), Action::FilterBackspace);
        filter_input.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::FilterClear);
        filter_input.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::CloseFilter);
        bindings.insert(KeyContext::FilterInput, filter_input);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings
        if let Some(action) = self
            .bindings
            .get(&context)
            .and_then(|bindings| bindings.get(&binding))
        {
            return Some(action.clone());
        }

        // Fall back to global bindings
        self.bindings
            .get(&KeyContext::Global)?
            .get(&binding)
            .cloned()
    }

    /// Handle key event in filter input mode.
    /// Special keys map to their bindings, printable characters to `FilterInput`.
    pub fn get_filter_input_action(&self, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        if let Some(action) = self
            .bindings
            .get(&KeyContext::FilterInput)
            .and_then(|bindings| bindings.get(&binding))
        {
            return Some(action.clone());
        }

        match key.code {
            KeyCode::Char(c)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                Some(Action::FilterInput(c))
            }
            _ => None,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_severity_toggles() {
        let bindings = KeyBindings::new();
        let cases = [
            ('E', Severity::Error),
            ('W', Severity::Warning),
            ('I', Severity::Info),
            ('D', Severity::Debug),
            ('V', Severity::Verbose),
            ('U', Severity::Unknown),
        ];
        for (c, severity) in cases {
            let action =
                bindings.get_action(KeyContext::LogViewer, &key(KeyCode::Char(c), KeyModifiers::SHIFT));
            assert_eq!(action, Some(Action::ToggleSeverity(severity)));
        }
    }

    #[test]
    fn test_global_fallback() {
        let bindings = KeyBindings::new();
        let quit = bindings.get_action(
            KeyContext::LogViewer,
            &key(KeyCode::Char('q'), KeyModifiers::NONE),
        );
        assert_eq!(quit, Some(Action::Quit));

        let unbound = bindings.get_action(
            KeyContext::LogViewer,
            &key(KeyCode::Char('z'), KeyModifiers::NONE),
        );
        assert_eq!(unbound, None);
    }

    #[test]
    fn test_filter_input_captures_text() {
        let bindings = KeyBindings::new();
        // Keys bound in the viewer are plain text while typing a filter
        assert_eq!(
            bindings.get_filter_input_action(&key(KeyCode::Char('q'), KeyModifiers::NONE)),
            Some(Action::FilterInput('q'))
        );
        assert_eq!(
            bindings.get_filter_input_action(&key(KeyCode::Char('E'), KeyModifiers::SHIFT)),
            Some(Action::FilterInput('E'))
        );
        assert_eq!(
            bindings.get_filter_input_action(&key(KeyCode::Backspace, KeyModifiers::NONE)),
            Some(Action::FilterBackspace)
        );
        assert_eq!(
            bindings.get_filter_input_action(&key(KeyCode::Esc, KeyModifiers::NONE)),
            Some(Action::CloseFilter)
        );
        assert_eq!(
            bindings.get_filter_input_action(&key(KeyCode::Char('x'), KeyModifiers::ALT)),
            None
        );
    }
}
