//! Validator for reedline - keeps reading while input is incomplete

use reedline::{ValidationResult, Validator};

use crate::parser::Lexer;

/// Multi-line input validator
///
/// Input is incomplete while a bracket or a string literal is still open.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellValidator;

impl ShellValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for ShellValidator {
    fn validate(&self, line: &str) -> ValidationResult {
        if line.trim().is_empty() || !Lexer::needs_continuation(line) {
            ValidationResult::Complete
        } else {
            ValidationResult::Incomplete
        }
    }
}
