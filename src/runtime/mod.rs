//! Evaluation runtime for shell input
//!
//! - `value`: runtime values and their Python-like rendering
//! - `types`: type registry shared with the completion analyzer
//! - `scope`: name/type snapshots published for completion
//! - `interpreter`: statement evaluation against a [`Session`](crate::session::Session)
//! - `help`: banner and `help()` texts

pub mod help;
mod interpreter;
mod scope;
pub mod types;
mod value;

pub use interpreter::{Interpreter, Mode, PRESET_NAMES};
pub use scope::{Binding, ScopeSnapshot, SharedScope};
pub use types::{Builtin, Member, MemberKind, TypeTag};
pub use value::{ClassKind, Value};
