//! Syntax highlighter for the shell language
//!
//! Highlighting reuses the shell lexer so that what is colored as a string or
//! a name is exactly what the parser will see.

use nu_ansi_term::{Color, Style};
use reedline::{Highlighter, StyledText};

use crate::config::ColorScheme;
use crate::parser::{Lexer, TokenKind};
use crate::runtime::{Builtin, PRESET_NAMES};

const KEYWORDS: &[&str] = &["True", "False", "None"];
const CLASSES: &[&str] = &["Client", "Collection"];

/// Styles for each token class
#[derive(Debug, Clone, Copy)]
struct Palette {
    keyword: Style,
    builtin: Style,
    preset: Style,
    string: Style,
    number: Style,
    punctuation: Style,
    comment: Style,
    error: Style,
}

impl Palette {
    fn zenburn() -> Self {
        Self {
            keyword: Color::Rgb(240, 223, 175).bold(),
            builtin: Color::Rgb(140, 208, 211).into(),
            preset: Color::Rgb(223, 175, 143).into(),
            string: Color::Rgb(204, 147, 147).into(),
            number: Color::Rgb(140, 208, 211).bold(),
            punctuation: Color::Rgb(159, 159, 143).into(),
            comment: Color::Rgb(127, 159, 127).italic(),
            error: Color::Rgb(227, 206, 171).on(Color::Rgb(51, 51, 51)).bold(),
        }
    }
}

/// Token-based highlighter with a selectable color scheme
#[derive(Debug, Clone, Copy)]
pub struct SyntaxHighlighter {
    palette: Option<Palette>,
}

impl SyntaxHighlighter {
    /// Create a highlighter; [`ColorScheme::Monochrome`] disables styling
    pub fn new(scheme: ColorScheme) -> Self {
        let palette = match scheme {
            ColorScheme::Zenburn => Some(Palette::zenburn()),
            ColorScheme::Monochrome => None,
        };
        Self { palette }
    }

    fn ident_style(palette: &Palette, name: &str) -> Style {
        if KEYWORDS.contains(&name) {
            palette.keyword
        } else if CLASSES.contains(&name) || Builtin::from_name(name).is_some() {
            palette.builtin
        } else if PRESET_NAMES.contains(&name) {
            palette.preset
        } else {
            Style::default()
        }
    }

    fn token_style(palette: &Palette, kind: &TokenKind) -> Style {
        match kind {
            TokenKind::Ident(name) => Self::ident_style(palette, name),
            TokenKind::Str { .. } => palette.string,
            TokenKind::Int(_) | TokenKind::Float(_) => palette.number,
            TokenKind::Unknown(_) => palette.error,
            TokenKind::Newline | TokenKind::Eof => Style::default(),
            _ => palette.punctuation,
        }
    }

    /// Push text between tokens: whitespace and `#` comments
    fn push_gap(styled: &mut StyledText, palette: &Palette, gap: String) {
        match gap.find('#') {
            Some(hash) => {
                let (space, comment) = gap.split_at(hash);
                if !space.is_empty() {
                    styled.push((Style::default(), space.to_string()));
                }
                styled.push((palette.comment, comment.to_string()));
            }
            None => styled.push((Style::default(), gap)),
        }
    }
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new(ColorScheme::default())
    }
}

impl Highlighter for SyntaxHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled = StyledText::new();
        let Some(palette) = &self.palette else {
            styled.push((Style::default(), line.to_string()));
            return styled;
        };

        let chars: Vec<char> = line.chars().collect();
        let mut last_end = 0;

        for token in Lexer::tokenize(line) {
            if token.span.start > last_end {
                let gap: String = chars[last_end..token.span.start].iter().collect();
                Self::push_gap(&mut styled, palette, gap);
            }
            if token.span.end > token.span.start {
                let text: String = chars[token.span.clone()].iter().collect();
                styled.push((Self::token_style(palette, &token.kind), text));
            }
            last_end = token.span.end;
        }

        if last_end < chars.len() {
            let rest: String = chars[last_end..].iter().collect();
            Self::push_gap(&mut styled, palette, rest);
        }

        styled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_text(styled: &StyledText) -> String {
        styled.buffer.iter().map(|(_, text)| text.as_str()).collect()
    }

    fn style_of(styled: &StyledText, text: &str) -> Style {
        styled
            .buffer
            .iter()
            .find(|(_, t)| t == text)
            .map(|(style, _)| *style)
            .unwrap()
    }

    #[test]
    fn test_text_is_preserved() {
        let highlighter = SyntaxHighlighter::default();
        for line in [
            "use('a')",
            "x = client.get_collection(\"b\")  # fetch",
            "names = ['a',\n  'b']",
            "print('unterminated",
            "café = 1.5 @",
        ] {
            assert_eq!(plain_text(&highlighter.highlight(line, 0)), line);
        }
    }

    #[test]
    fn test_token_classes() {
        let highlighter = SyntaxHighlighter::default();
        let palette = Palette::zenburn();
        let styled = highlighter.highlight("x = use('a') # go", 0);

        assert_eq!(style_of(&styled, "use"), palette.builtin);
        assert_eq!(style_of(&styled, "'a'"), palette.string);
        assert_eq!(style_of(&styled, "# go"), palette.comment);
        assert_eq!(style_of(&styled, "x"), Style::default());
    }

    #[test]
    fn test_keywords_and_presets() {
        let highlighter = SyntaxHighlighter::default();
        let palette = Palette::zenburn();
        let styled = highlighter.highlight("collection is None", 0);

        assert_eq!(style_of(&styled, "collection"), palette.preset);
        assert_eq!(style_of(&styled, "None"), palette.keyword);
    }

    #[test]
    fn test_monochrome_is_unstyled() {
        let highlighter = SyntaxHighlighter::new(ColorScheme::Monochrome);
        let styled = highlighter.highlight("use('a')", 0);
        assert_eq!(styled.buffer.len(), 1);
        assert_eq!(styled.buffer[0].0, Style::default());
    }
}
