//! Line sources feeding the REPL engine
//!
//! [`TerminalSource`] drives an interactive terminal through reedline.
//! [`ScriptedSource`] replays a fixed list of inputs and records what the
//! engine asked of it, which makes the whole loop testable without a TTY.

use std::collections::VecDeque;
use std::io;

use crossterm::execute;
use crossterm::terminal::SetTitle;
use nu_ansi_term::{Color, Style};
use reedline::{
    ColumnarMenu, Emacs, FileBackedHistory, KeyCode, KeyModifiers, MenuBuilder, Reedline,
    ReedlineEvent, ReedlineMenu, Signal, default_emacs_keybindings,
};
use tracing::{debug, warn};

use crate::error::{Result, ShellError};

use super::highlighter::SyntaxHighlighter;
use super::prompt::ShellPrompt;
use super::settings::ReplSettings;
use super::validator::ShellValidator;

/// Result of one read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A complete (possibly multi-line) input
    Line(String),
    /// Ctrl-C: current input discarded
    Interrupt,
    /// Ctrl-D or closed input
    Eof,
}

/// Where the REPL engine reads input from
pub trait LineSource {
    /// Apply settings once before the first read
    fn apply(&mut self, settings: &ReplSettings) -> Result<()>;

    /// Read the next input
    ///
    /// # Arguments
    /// * `status` - Status line to show, if the status bar is enabled
    fn read_line(&mut self, status: Option<&str>) -> Result<ReadOutcome>;

    /// Ask a yes/no question, `true` means yes
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Interactive terminal input through reedline
pub struct TerminalSource {
    editor: Reedline,
    prompt: ShellPrompt,
}

impl TerminalSource {
    /// Terminal source with stock reedline behaviour until settings are applied
    pub fn new() -> Self {
        Self {
            editor: Reedline::create(),
            prompt: ShellPrompt::new(">>>", "..."),
        }
    }

    fn build_editor(settings: &ReplSettings) -> Reedline {
        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu("completion_menu".to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );
        keybindings.add_binding(
            KeyModifiers::SHIFT,
            KeyCode::BackTab,
            ReedlineEvent::MenuPrevious,
        );

        let mut editor = Reedline::create()
            .with_edit_mode(Box::new(Emacs::new(keybindings)))
            .with_highlighter(Box::new(SyntaxHighlighter::new(settings.color_scheme)))
            .with_validator(Box::new(ShellValidator::new()));

        if let Some(completer) = &settings.completer {
            let menu = if settings.color_enabled() {
                ColumnarMenu::default()
                    .with_name("completion_menu")
                    .with_text_style(Style::new().fg(Color::Rgb(220, 220, 204)))
                    .with_selected_text_style(
                        Style::new().fg(Color::Black).on(Color::Rgb(140, 208, 211)).bold(),
                    )
            } else {
                ColumnarMenu::default().with_name("completion_menu")
            };
            editor = editor
                .with_completer(Box::new(completer.clone()))
                .with_menu(ReedlineMenu::EngineCompleter(Box::new(menu)));
        }

        if let Some(history) = settings.history.as_ref().filter(|h| h.persist) {
            if let Some(parent) = history.file_path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    debug!("History directory {} not created: {}", parent.display(), e);
                }
            }
            match FileBackedHistory::with_file(history.max_size, history.file_path.clone()) {
                Ok(file_history) => editor = editor.with_history(Box::new(file_history)),
                Err(e) => warn!(
                    "History file {} unavailable: {}",
                    history.file_path.display(),
                    e
                ),
            }
        }

        editor
    }
}

impl Default for TerminalSource {
    fn default() -> Self {
        Self::new()
    }
}

fn read_error(e: io::Error) -> ShellError {
    ShellError::Generic(format!("Read error: {}", e))
}

impl LineSource for TerminalSource {
    fn apply(&mut self, settings: &ReplSettings) -> Result<()> {
        self.editor = Self::build_editor(settings);
        self.prompt = ShellPrompt::new(&settings.in_prompt, &settings.continuation_prompt);

        if !settings.title.is_empty() {
            execute!(io::stdout(), SetTitle(&settings.title))?;
        }
        debug!("Terminal configured");
        Ok(())
    }

    fn read_line(&mut self, status: Option<&str>) -> Result<ReadOutcome> {
        self.prompt.set_status(status.map(str::to_string));

        let signal = self.editor.read_line(&self.prompt).map_err(read_error)?;
        match signal {
            Signal::Success(line) => Ok(ReadOutcome::Line(line)),
            Signal::CtrlC => Ok(ReadOutcome::Interrupt),
            Signal::CtrlD => Ok(ReadOutcome::Eof),
            #[allow(unreachable_patterns)]
            _ => Ok(ReadOutcome::Interrupt),
        }
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        let prompt = ShellPrompt::question(question);
        let signal = self.editor.read_line(&prompt).map_err(read_error)?;
        match signal {
            Signal::Success(answer) => Ok(matches!(
                answer.trim().to_lowercase().as_str(),
                "y" | "yes"
            )),
            Signal::CtrlD => Ok(true),
            _ => Ok(false),
        }
    }
}

/// Replays prepared inputs
#[derive(Debug, Default)]
pub struct ScriptedSource {
    inputs: VecDeque<ReadOutcome>,
    answers: VecDeque<bool>,
    applied: Vec<ReplSettings>,
    statuses: Vec<Option<String>>,
    questions: Vec<String>,
}

impl ScriptedSource {
    /// Source returning `lines` in order, then end of input
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: lines
                .into_iter()
                .map(|line| ReadOutcome::Line(line.into()))
                .collect(),
            ..Default::default()
        }
    }

    /// Queue an arbitrary outcome after the current inputs
    pub fn push(mut self, outcome: ReadOutcome) -> Self {
        self.inputs.push_back(outcome);
        self
    }

    /// Queue answers for confirmation questions; unanswered questions get yes
    pub fn with_answers(mut self, answers: &[bool]) -> Self {
        self.answers.extend(answers);
        self
    }

    /// Settings applied so far, one entry per `apply` call
    pub fn applied(&self) -> &[ReplSettings] {
        &self.applied
    }

    /// Status line passed to each read
    pub fn statuses(&self) -> &[Option<String>] {
        &self.statuses
    }

    /// Questions asked so far
    pub fn questions(&self) -> &[String] {
        &self.questions
    }
}

impl LineSource for ScriptedSource {
    fn apply(&mut self, settings: &ReplSettings) -> Result<()> {
        self.applied.push(settings.clone());
        Ok(())
    }

    fn read_line(&mut self, status: Option<&str>) -> Result<ReadOutcome> {
        self.statuses.push(status.map(str::to_string));
        Ok(self.inputs.pop_front().unwrap_or(ReadOutcome::Eof))
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.questions.push(question.to_string());
        Ok(self.answers.pop_front().unwrap_or(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::SharedScope;

    #[test]
    fn test_scripted_source_replays_then_ends() {
        let mut source = ScriptedSource::new(["a", "b"]).push(ReadOutcome::Interrupt);

        assert_eq!(source.read_line(None).unwrap(), ReadOutcome::Line("a".into()));
        assert_eq!(
            source.read_line(Some("status")).unwrap(),
            ReadOutcome::Line("b".into())
        );
        assert_eq!(source.read_line(None).unwrap(), ReadOutcome::Interrupt);
        assert_eq!(source.read_line(None).unwrap(), ReadOutcome::Eof);
        assert_eq!(source.statuses()[1].as_deref(), Some("status"));
    }

    #[test]
    fn test_scripted_source_answers() {
        let mut source = ScriptedSource::default().with_answers(&[false]);
        assert!(!source.confirm("leave?").unwrap());
        assert!(source.confirm("leave?").unwrap());
        assert_eq!(source.questions().len(), 2);
    }

    #[test]
    fn test_scripted_source_records_settings() {
        let mut source = ScriptedSource::default();
        let settings = ReplSettings::new(SharedScope::new());
        source.apply(&settings).unwrap();
        assert_eq!(source.applied().len(), 1);
        assert_eq!(source.applied()[0].in_prompt, ">>>");
    }
}
