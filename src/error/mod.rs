//! Error handling for the Deker shell.
//!
//! Every fallible operation in the crate returns [`Result`], whose error type
//! [`ShellError`] wraps the more specific kinds below:
//! - [`ConnectionError`] when a storage client cannot be opened
//! - [`StorageError`] for failures of an open client
//! - [`ParseError`] and [`EvalError`] for shell input
//! - [`ScriptError`] for script mode
//! - [`ConfigError`] for malformed command-line values
//!
//! Completion has its own [`CompletionError`]: it never reaches the user and
//! is turned into an empty suggestion list by the completion pipeline.
//!
//! # Example
//!
//! ```rust
//! use deker_shell::error::{Result, ShellError};
//!
//! fn check(uri: &str) -> Result<()> {
//!     if uri.is_empty() {
//!         return Err(ShellError::InvalidUri("empty uri".to_string()));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check("").is_err());
//! ```

pub mod kinds;

pub use kinds::{
    CompletionError, ConfigError, ConnectionError, EvalError, ParseError, Result, ScriptError,
    ShellError, StorageError,
};
