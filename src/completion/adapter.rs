//! Conversion of ranked candidates into display records

use super::candidate::{Candidate, CandidateKind, StyleHint};

/// A completion ready for the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedCompletion {
    /// Text that replaces the typed prefix
    pub insertion_text: String,
    /// `len(complete) - len(name_with_symbols)` in characters; the negated
    /// length of the prefix the insertion replaces
    pub cursor_offset_delta: isize,
    pub display_label: String,
    pub display_suffix: &'static str,
    pub display_meta: CandidateKind,
    pub style: StyleHint,
}

/// Maps ranked candidates to [`RankedCompletion`]s, preserving order
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionAdapter;

impl CompletionAdapter {
    /// Decorative suffix shown after the label
    pub fn suffix(kind: CandidateKind) -> &'static str {
        match kind {
            CandidateKind::Function => "()",
            CandidateKind::Parameter => "...",
            CandidateKind::Class
            | CandidateKind::Module
            | CandidateKind::Instance
            | CandidateKind::Other => "",
        }
    }

    pub fn adapt_one(candidate: Candidate) -> RankedCompletion {
        let complete_len = candidate.complete.chars().count() as isize;
        let label_len = candidate.name_with_symbols.chars().count() as isize;

        RankedCompletion {
            cursor_offset_delta: complete_len - label_len,
            display_suffix: Self::suffix(candidate.kind),
            display_meta: candidate.kind,
            style: candidate.style,
            display_label: candidate.name_with_symbols.clone(),
            insertion_text: candidate.name_with_symbols,
        }
    }

    /// Lazily adapt a ranked sequence
    pub fn adapt<I>(ranked: I) -> impl Iterator<Item = RankedCompletion>
    where
        I: IntoIterator<Item = Candidate>,
    {
        ranked.into_iter().map(Self::adapt_one)
    }
}
