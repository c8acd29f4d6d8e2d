//! Prompt rendering for reedline

use std::borrow::Cow;

use reedline::{Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};

/// Shell prompt: input glyph on the left, optional status line on the right
#[derive(Debug, Clone, Default)]
pub struct ShellPrompt {
    indicator: String,
    continuation: String,
    status: Option<String>,
}

impl ShellPrompt {
    /// Create a new shell prompt
    ///
    /// # Arguments
    /// * `indicator` - Glyph shown before input, followed by one space
    /// * `continuation` - Glyph shown on continuation lines
    pub fn new(indicator: &str, continuation: &str) -> Self {
        Self {
            indicator: with_space(indicator),
            continuation: with_space(continuation),
            status: None,
        }
    }

    /// Prompt asking a single question, used for exit confirmation
    pub fn question(text: &str) -> Self {
        Self::new(text, "")
    }

    /// Replace the right-hand status line
    pub fn set_status(&mut self, status: Option<String>) {
        self.status = status;
    }
}

fn with_space(glyph: &str) -> String {
    if glyph.is_empty() {
        String::new()
    } else {
        format!("{glyph} ")
    }
}

impl Prompt for ShellPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.indicator)
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        match &self.status {
            Some(status) => Cow::Borrowed(status),
            None => Cow::Borrowed(""),
        }
    }

    /// The indicator is part of the left prompt already
    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.continuation)
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        format!("({}reverse-search: {}) ", prefix, history_search.term).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyphs() {
        let prompt = ShellPrompt::new(">", "...");
        assert_eq!(prompt.render_prompt_left(), "> ");
        assert_eq!(prompt.render_prompt_multiline_indicator(), "... ");
        assert_eq!(prompt.render_prompt_indicator(PromptEditMode::Default), "");
    }

    #[test]
    fn test_empty_glyph_has_no_space() {
        let prompt = ShellPrompt::new("", "");
        assert_eq!(prompt.render_prompt_left(), "");
    }

    #[test]
    fn test_status_line() {
        let mut prompt = ShellPrompt::new(">", "...");
        assert_eq!(prompt.render_prompt_right(), "");

        prompt.set_status(Some("file:///tmp/db | a".to_string()));
        assert_eq!(prompt.render_prompt_right(), "file:///tmp/db | a");
    }
}
