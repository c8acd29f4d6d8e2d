//! Error-tolerant lexer for shell input
//!
//! The lexer never fails: unknown characters become [`TokenKind::Unknown`]
//! and an unclosed string literal is reported through
//! [`TokenKind::Str::terminated`]. This lets the same token stream serve the
//! parser, the completion analyzer (which works on half-typed input) and the
//! multi-line validator.
//!
//! Newlines are significant only at bracket depth zero, where they separate
//! statements. Spans are character offsets.

use std::fmt;
use std::ops::Range;

/// Token types of the shell language
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier or keyword (`True`, `False`, `None` are resolved by the parser)
    Ident(String),
    /// String literal, `terminated` is false when the closing quote is missing
    Str { value: String, terminated: bool },
    /// Integer literal
    Int(String),
    /// Float literal
    Float(String),
    Dot,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Equals,
    Minus,
    Semicolon,
    /// Statement separator at bracket depth zero
    Newline,
    /// End of input
    Eof,
    /// Unknown character
    Unknown(char),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "'{name}'"),
            TokenKind::Str { value, .. } => write!(f, "string '{value}'"),
            TokenKind::Int(n) | TokenKind::Float(n) => write!(f, "number {n}"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Equals => write!(f, "'='"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::Unknown(ch) => write!(f, "'{ch}'"),
        }
    }
}

/// Token with position information
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    /// Create a new token
    pub fn new(kind: TokenKind, span: Range<usize>) -> Self {
        Self { kind, span }
    }
}

/// Shell lexer
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Lexer {
    /// Create a new lexer from input string
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    /// Tokenize the entire input, always ending with [`TokenKind::Eof`]
    pub fn tokenize(input: &str) -> Vec<Token> {
        let mut lexer = Self::new(input);
        let mut tokens = Vec::new();

        loop {
            let token = lexer.next_token();
            let is_eof = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        tokens
    }

    /// Whether the input still needs more lines: an open bracket or string
    pub fn needs_continuation(input: &str) -> bool {
        let mut lexer = Self::new(input);
        loop {
            let token = lexer.next_token();
            match token.kind {
                TokenKind::Str {
                    terminated: false, ..
                } => return true,
                TokenKind::Eof => return lexer.depth > 0,
                _ => {}
            }
        }
    }

    fn next_token(&mut self) -> Token {
        self.skip_trivia();

        let start = self.pos;

        if self.is_at_end() {
            return Token::new(TokenKind::Eof, start..start);
        }

        let ch = self.current_char();

        let kind = match ch {
            '\n' => TokenKind::Newline,
            '.' if self.peek_char().is_ascii_digit() => return self.scan_number(start),
            '.' => TokenKind::Dot,
            '(' => {
                self.depth += 1;
                TokenKind::LParen
            }
            ')' => {
                self.depth = self.depth.saturating_sub(1);
                TokenKind::RParen
            }
            '[' => {
                self.depth += 1;
                TokenKind::LBracket
            }
            ']' => {
                self.depth = self.depth.saturating_sub(1);
                TokenKind::RBracket
            }
            ',' => TokenKind::Comma,
            '=' => TokenKind::Equals,
            '-' => TokenKind::Minus,
            ';' => TokenKind::Semicolon,
            '\'' | '"' => return self.scan_string(ch, start),
            '0'..='9' => return self.scan_number(start),
            c if c.is_alphabetic() || c == '_' => return self.scan_identifier(start),
            _ => TokenKind::Unknown(ch),
        };

        self.advance();
        Token::new(kind, start..self.pos)
    }

    /// Scan a string literal
    fn scan_string(&mut self, quote: char, start: usize) -> Token {
        self.advance(); // opening quote

        let mut value = String::new();

        while !self.is_at_end() && self.current_char() != quote {
            let ch = self.current_char();
            if ch == '\\' {
                self.advance();
                if self.is_at_end() {
                    value.push('\\');
                    break;
                }
                match self.current_char() {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '\\' => value.push('\\'),
                    '\'' => value.push('\''),
                    '"' => value.push('"'),
                    ch => {
                        value.push('\\');
                        value.push(ch);
                    }
                }
            } else {
                value.push(ch);
            }
            self.advance();
        }

        let terminated = !self.is_at_end();
        if terminated {
            self.advance(); // closing quote
        }

        Token::new(TokenKind::Str { value, terminated }, start..self.pos)
    }

    /// Scan an integer or float
    fn scan_number(&mut self, start: usize) -> Token {
        let mut value = String::new();
        let mut is_float = false;

        while !self.is_at_end() && self.current_char().is_ascii_digit() {
            value.push(self.current_char());
            self.advance();
        }

        if self.current_char() == '.' && self.peek_char().is_ascii_digit() {
            is_float = true;
            value.push('.');
            self.advance();
            while !self.is_at_end() && self.current_char().is_ascii_digit() {
                value.push(self.current_char());
                self.advance();
            }
        }

        let kind = if is_float {
            TokenKind::Float(value)
        } else {
            TokenKind::Int(value)
        };
        Token::new(kind, start..self.pos)
    }

    /// Scan an identifier
    fn scan_identifier(&mut self, start: usize) -> Token {
        let mut value = String::new();

        while !self.is_at_end() {
            let ch = self.current_char();
            if ch.is_alphanumeric() || ch == '_' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::new(TokenKind::Ident(value), start..self.pos)
    }

    /// Skip blanks and comments; newlines inside brackets count as blanks
    fn skip_trivia(&mut self) {
        while !self.is_at_end() {
            let ch = self.current_char();
            if ch == '#' {
                while !self.is_at_end() && self.current_char() != '\n' {
                    self.advance();
                }
            } else if ch.is_whitespace() && (ch != '\n' || self.depth > 0) {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn current_char(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.input[self.pos]
        }
    }

    fn peek_char(&self) -> char {
        self.input.get(self.pos + 1).copied().unwrap_or('\0')
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_attribute_call() {
        let tokens = kinds("client.get_collection('a')");
        assert_eq!(tokens.len(), 7);
        assert!(matches!(tokens[0], TokenKind::Ident(ref s) if s == "client"));
        assert!(matches!(tokens[1], TokenKind::Dot));
        assert!(matches!(tokens[2], TokenKind::Ident(ref s) if s == "get_collection"));
        assert!(matches!(tokens[3], TokenKind::LParen));
        assert!(matches!(
            tokens[4],
            TokenKind::Str { ref value, terminated: true } if value == "a"
        ));
        assert!(matches!(tokens[5], TokenKind::RParen));
        assert!(matches!(tokens[6], TokenKind::Eof));
    }

    #[test]
    fn test_unterminated_string() {
        let tokens = kinds("use('wea");
        assert!(matches!(
            tokens[2],
            TokenKind::Str { ref value, terminated: false } if value == "wea"
        ));
    }

    #[test]
    fn test_numbers() {
        let tokens = kinds("42 3.5 .5");
        assert!(matches!(tokens[0], TokenKind::Int(ref n) if n == "42"));
        assert!(matches!(tokens[1], TokenKind::Float(ref n) if n == "3.5"));
        assert!(matches!(tokens[2], TokenKind::Float(ref n) if n == ".5"));
    }

    #[test]
    fn test_newline_only_at_depth_zero() {
        let tokens = kinds("a = 1\nprint(\n  a\n)");
        let newlines = tokens
            .iter()
            .filter(|t| matches!(t, TokenKind::Newline))
            .count();
        assert_eq!(newlines, 1);
    }

    #[test]
    fn test_comments_skipped() {
        let tokens = kinds("x # the answer\ny");
        assert_eq!(tokens.len(), 4); // x, newline, y, EOF
        assert!(matches!(tokens[2], TokenKind::Ident(ref s) if s == "y"));
    }

    #[test]
    fn test_spans_are_char_offsets() {
        let tokens = Lexer::tokenize("é.x");
        assert_eq!(tokens[1].span, 1..2);
        assert_eq!(tokens[2].span, 2..3);
    }

    #[test]
    fn test_unknown_chars() {
        let tokens = kinds("a @ b");
        assert!(tokens.iter().any(|t| matches!(t, TokenKind::Unknown('@'))));
    }

    #[test]
    fn test_needs_continuation() {
        assert!(Lexer::needs_continuation("print("));
        assert!(Lexer::needs_continuation("x = [1,\n2"));
        assert!(Lexer::needs_continuation("'abc"));
        assert!(!Lexer::needs_continuation("print('a')"));
        assert!(!Lexer::needs_continuation("x = ')'"));
        assert!(!Lexer::needs_continuation(""));
    }
}
