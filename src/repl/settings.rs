use crate::config::{ColorScheme, HistoryConfig};
use crate::runtime::SharedScope;

use super::completer::ShellCompleter;

/// Behaviour of one REPL instance.
///
/// [`ReplEngine::embed`](super::ReplEngine::embed) creates these with the
/// engine's stock values and hands them to the configure callback once,
/// before the loop starts.
#[derive(Debug, Clone)]
pub struct ReplSettings {
    /// Names and types visible to the completer
    pub scope: SharedScope,
    pub in_prompt: String,
    pub continuation_prompt: String,
    /// Prefix printed before echoed results
    pub out_prompt: String,
    /// Terminal window title, untouched when empty
    pub title: String,
    /// Ask before leaving on end of input
    pub confirm_exit: bool,
    /// Right-hand status line with the client URI and current collection
    pub show_status_bar: bool,
    pub color_scheme: ColorScheme,
    /// Completion source, none means Tab does nothing
    pub completer: Option<ShellCompleter>,
    /// History persistence, none keeps history in memory
    pub history: Option<HistoryConfig>,
}

impl ReplSettings {
    /// Stock settings over `scope`
    pub fn new(scope: SharedScope) -> Self {
        Self {
            scope,
            in_prompt: ">>>".to_string(),
            continuation_prompt: "...".to_string(),
            out_prompt: String::new(),
            title: String::new(),
            confirm_exit: true,
            show_status_bar: true,
            color_scheme: ColorScheme::default(),
            completer: None,
            history: None,
        }
    }

    /// Whether output may contain ANSI colors
    pub fn color_enabled(&self) -> bool {
        self.color_scheme != ColorScheme::Monochrome
    }
}
