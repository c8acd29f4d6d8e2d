//! Script mode
//!
//! A script is a file of shell statements run top to bottom with no preset
//! bindings. Nothing is connected up front: a script that wants storage
//! calls `Client(uri, ...)` itself, and that client is closed when the script
//! ends.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::{debug, info};

use crate::client::Connector;
use crate::config::ClientOptions;
use crate::error::{Result, ScriptError};
use crate::parser::Lexer;
use crate::runtime::{Interpreter, Mode};
use crate::session::Session;

/// File extension that selects script mode on the command line
pub const SCRIPT_EXTENSION: &str = "dsh";

const DEFAULT_MAX_SIZE: u64 = 10 * 1024 * 1024;

/// Script loader for reading and validating script files
#[derive(Debug, Clone)]
pub struct ScriptLoader {
    /// Maximum script size in bytes
    max_size_bytes: u64,
}

impl ScriptLoader {
    /// Loader with the default 10 MiB limit
    pub fn new() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_SIZE,
        }
    }

    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_size_bytes = bytes;
        self
    }

    /// Load script from file
    ///
    /// # Arguments
    /// * `path` - Path to script file
    ///
    /// # Returns
    /// * `Result<String>` - Script content or error
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(ScriptError::FileNotFound(path.display().to_string()).into());
        }

        let size = fs::metadata(path)?.len();
        if size > self.max_size_bytes {
            return Err(ScriptError::TooLarge {
                size,
                max: self.max_size_bytes,
            }
            .into());
        }

        let bytes = fs::read(path)?;
        String::from_utf8(bytes)
            .map_err(|_| ScriptError::InvalidEncoding(path.display().to_string()).into())
    }

    /// Check if the path names a script file
    pub fn has_script_extension(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(SCRIPT_EXTENSION))
    }
}

impl Default for ScriptLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// A complete input spanning one or more lines of a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptUnit {
    /// 1-based line the unit starts on
    pub line: usize,
    pub source: String,
}

/// Group script lines into complete inputs; brackets and strings may span lines
pub fn split_units(content: &str) -> Vec<ScriptUnit> {
    let mut units = Vec::new();
    let mut buffer = String::new();
    let mut start = 0;

    for (index, line) in content.lines().enumerate() {
        if buffer.is_empty() {
            if line.trim().is_empty() {
                continue;
            }
            start = index + 1;
        } else {
            buffer.push('\n');
        }
        buffer.push_str(line);

        if !Lexer::needs_continuation(&buffer) {
            units.push(ScriptUnit {
                line: start,
                source: std::mem::take(&mut buffer),
            });
        }
    }

    if !buffer.is_empty() {
        units.push(ScriptUnit {
            line: start,
            source: buffer,
        });
    }

    units
}

/// Run the script at `path`
///
/// # Arguments
/// * `path` - Script file
/// * `connector` - Used when the script calls `Client(...)`
/// * `options` - Defaults for keywords the script's `Client(...)` call omits
/// * `out` - Receives everything the script prints
///
/// # Returns
/// * `Result<()>` - The first failing statement aborts the script with its line
pub async fn run_script<W: Write>(
    path: &Path,
    connector: &dyn Connector,
    options: &ClientOptions,
    out: &mut W,
) -> Result<()> {
    let content = ScriptLoader::new().load_file(path)?;
    info!(path = %path.display(), "Running script");

    let mut session = Session::new();
    let result = execute(&content, &mut session, connector, options, out).await;

    if session.close().await {
        debug!("Script client closed");
    }
    result
}

async fn execute<W: Write>(
    content: &str,
    session: &mut Session,
    connector: &dyn Connector,
    options: &ClientOptions,
    out: &mut W,
) -> Result<()> {
    let mut interpreter =
        Interpreter::new(session, connector, Mode::Script).with_client_defaults(options.clone());

    for unit in split_units(content) {
        let result = interpreter.execute(&unit.source).await;
        for printed in interpreter.take_output() {
            writeln!(out, "{}", printed)?;
        }
        if let Err(e) = result {
            return Err(ScriptError::Failed {
                line: unit.line,
                message: e.to_string(),
            }
            .into());
        }
        if interpreter.exit_requested() {
            debug!(line = unit.line, "Script called exit");
            break;
        }
    }

    Ok(())
}
