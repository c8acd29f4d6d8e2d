//! Deker Shell Library
//!
//! Core of the `deker-shell` binary: an interactive console for Deker array
//! storage with context-aware tab completion.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `client`: Storage client contract and the file-backed client
//! - `completion`: Completion analysis, filtering, ranking and display
//! - `config`: Client options and shell settings
//! - `error`: Error types and handling
//! - `parser`: Lexer and parser for shell input
//! - `repl`: Interactive REPL engine on reedline
//! - `runtime`: Evaluation of shell input
//! - `script`: Script execution
//! - `session`: Lifetime of the storage client and the current collection
//! - `shell`: Interactive shell lifecycle
//!
//! # Example
//!
//! ```no_run
//! use deker_shell::client::DefaultConnector;
//! use deker_shell::config::Config;
//! use deker_shell::repl::TerminalSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     deker_shell::shell::run_interactive(
//!         &DefaultConnector,
//!         "file:///var/lib/deker",
//!         &config.client,
//!         &config.shell,
//!         TerminalSource::new(),
//!         &mut std::io::stdout(),
//!     )
//!     .await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod completion;
pub mod config;
pub mod error;
pub mod parser;
pub mod repl;
pub mod runtime;
pub mod script;
pub mod session;
pub mod shell;

// Re-export commonly used types
pub use completion::{CompletionPipeline, RankedCompletion};
pub use config::Config;
pub use error::{Result, ShellError};
pub use repl::ReplEngine;
pub use session::Session;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}
