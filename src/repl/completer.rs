//! Completer for reedline - provides completion suggestions

use nu_ansi_term::{Color, Style};
use reedline::{Completer, Span, Suggestion};

use crate::completion::{
    CandidateKind, CompletionPipeline, CompletionRequest, RankedCompletion, StyleHint,
};

/// Reedline completer backed by the completion pipeline
#[derive(Debug, Clone)]
pub struct ShellCompleter {
    pipeline: CompletionPipeline,
    color_enabled: bool,
}

impl ShellCompleter {
    /// Create a new shell completer
    ///
    /// # Arguments
    /// * `pipeline` - Analysis, filter, ranking and adaptation stages
    /// * `color_enabled` - Whether suggestions carry styles
    pub fn new(pipeline: CompletionPipeline, color_enabled: bool) -> Self {
        Self {
            pipeline,
            color_enabled,
        }
    }

    fn style(&self, hint: StyleHint) -> Option<Style> {
        if !self.color_enabled {
            return None;
        }
        match hint {
            StyleHint::Plain => None,
            StyleHint::Builtin => Some(Color::Rgb(140, 208, 211).into()),
            StyleHint::Private | StyleHint::Magic => Some(Color::DarkGray.into()),
            StyleHint::Keyword => Some(Color::Rgb(240, 223, 175).bold()),
            StyleHint::Parameter => Some(Color::Rgb(223, 175, 143).into()),
        }
    }

    fn to_suggestion(&self, line: &str, pos: usize, completion: RankedCompletion) -> Suggestion {
        let typed = completion.cursor_offset_delta.unsigned_abs();
        Suggestion {
            description: Some(describe(completion.display_suffix, completion.display_meta)),
            style: self.style(completion.style),
            span: Span::new(span_start(line, pos, typed), pos),
            value: completion.insertion_text,
            append_whitespace: false,
            ..Default::default()
        }
    }
}

/// Menu description column: display suffix followed by the candidate kind
fn describe(suffix: &str, meta: CandidateKind) -> String {
    if suffix.is_empty() {
        meta.to_string()
    } else {
        format!("{} {}", suffix, meta)
    }
}

/// Byte offset `typed` characters before `pos`
fn span_start(line: &str, pos: usize, typed: usize) -> usize {
    if typed == 0 {
        return pos;
    }
    line.get(..pos)
        .unwrap_or(line)
        .char_indices()
        .rev()
        .nth(typed - 1)
        .map(|(index, _)| index)
        .unwrap_or(0)
}

impl Completer for ShellCompleter {
    /// Complete the input at the given cursor position
    ///
    /// # Arguments
    /// * `line` - The whole input buffer
    /// * `pos` - Cursor position (byte index)
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let request = CompletionRequest::at_byte_offset(line, pos);
        self.pipeline
            .complete(&request)
            .into_iter()
            .map(|completion| self.to_suggestion(line, pos, completion))
            .collect()
    }
}
