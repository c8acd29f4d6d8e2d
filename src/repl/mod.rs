//! REPL (Read-Eval-Print Loop) for the deker shell
//!
//! - `engine`: [`ReplEngine`], the read/evaluate/print loop over a [`LineSource`]
//! - `settings`: [`ReplSettings`] handed to the configure callback
//! - `configure`: [`ShellConfigurator`], the shell's one-shot setup
//! - `source`: reedline terminal input and a scripted source for tests
//! - `completer`, `highlighter`, `validator`, `prompt`: reedline plug-ins

mod completer;
mod configure;
mod engine;
mod highlighter;
mod prompt;
mod settings;
mod source;
mod validator;

pub use completer::ShellCompleter;
pub use configure::ShellConfigurator;
pub use engine::{EXIT_QUESTION, ExitReason, ReplEngine, status_line};
pub use highlighter::SyntaxHighlighter;
pub use prompt::ShellPrompt;
pub use settings::ReplSettings;
pub use source::{LineSource, ReadOutcome, ScriptedSource, TerminalSource};
pub use validator::ShellValidator;
