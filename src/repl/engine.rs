use std::io::Write;

use tracing::debug;

use crate::error::Result;
use crate::runtime::{Interpreter, SharedScope, Value};
use crate::session::Session;

use super::settings::ReplSettings;
use super::source::{LineSource, ReadOutcome};

/// Question asked on end of input when exit confirmation is enabled
pub const EXIT_QUESTION: &str = "Do you really want to exit? [y/N]";

/// Why the REPL loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Ctrl-D or exhausted input
    EndOfInput,
    /// `exit()` or `quit()` was evaluated
    ExitCalled,
}

/// REPL engine for interactive command execution
pub struct ReplEngine<S: LineSource> {
    source: S,
    settings: ReplSettings,
}

impl<S: LineSource> ReplEngine<S> {
    /// Create an engine and run `configure` once before any input is read
    ///
    /// # Arguments
    /// * `scope` - Scope snapshots published by the interpreter
    /// * `source` - Where input lines come from
    /// * `configure` - Receives the stock settings for adjustment
    ///
    /// # Returns
    /// * `Result<Self>` - Engine ready to run, or the source's setup error
    pub fn embed<F>(scope: SharedScope, mut source: S, configure: F) -> Result<Self>
    where
        F: FnOnce(&mut ReplSettings),
    {
        let mut settings = ReplSettings::new(scope);
        configure(&mut settings);
        source.apply(&settings)?;

        Ok(Self { source, settings })
    }

    pub fn settings(&self) -> &ReplSettings {
        &self.settings
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Read, evaluate and print until end of input or `exit()`
    ///
    /// Evaluation errors are printed and the loop continues; only failures of
    /// the line source or of `out` end the loop with an error.
    pub async fn run<W: Write>(
        &mut self,
        interpreter: &mut Interpreter<'_>,
        out: &mut W,
    ) -> Result<ExitReason> {
        let color = self.settings.color_enabled();

        loop {
            let status = self
                .settings
                .show_status_bar
                .then(|| status_line(interpreter.session()));

            match self.source.read_line(status.as_deref())? {
                ReadOutcome::Line(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    let result = interpreter.execute(&line).await;
                    for printed in interpreter.take_output() {
                        writeln!(out, "{}", printed)?;
                    }
                    match result {
                        Ok(Some(value)) => self.echo(out, &value, color)?,
                        Ok(None) => {}
                        Err(e) => writeln!(out, "{}", e)?,
                    }

                    if interpreter.exit_requested() {
                        debug!("Exit requested");
                        return Ok(ExitReason::ExitCalled);
                    }
                }
                ReadOutcome::Interrupt => {
                    debug!("Input interrupted");
                }
                ReadOutcome::Eof => {
                    if self.settings.confirm_exit && !self.source.confirm(EXIT_QUESTION)? {
                        continue;
                    }
                    return Ok(ExitReason::EndOfInput);
                }
            }
        }
    }

    fn echo<W: Write>(&self, out: &mut W, value: &Value, color: bool) -> Result<()> {
        writeln!(out, "{}{}", self.settings.out_prompt, value.render(color))?;
        Ok(())
    }
}

/// Status bar text: client URI and current collection
pub fn status_line(session: &Session) -> String {
    let uri = session.uri().unwrap_or("not connected");
    match session.collection() {
        Some(collection) => format!("{} | collection: {}", uri, collection.name),
        None => format!("{} | collection: None", uri),
    }
}
