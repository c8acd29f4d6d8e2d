//! Parser for the shell language
//!
//! The shell accepts a small expression language:
//!
//! ```text
//! program    := statement ((NEWLINE | ';') statement)*
//! statement  := IDENT '=' expr | expr
//! expr       := '-' expr | postfix
//! postfix    := primary ('.' IDENT | '(' arguments ')' | '[' expr ']')*
//! primary    := STRING | INT | FLOAT | True | False | None | IDENT
//!             | '[' (expr (',' expr)* ','?)? ']' | '(' expr ')'
//! arguments  := (arg (',' arg)* ','?)?
//! arg        := IDENT '=' expr | expr
//! ```
//!
//! The module is split into:
//! - `lexer`: error-tolerant tokenizer shared with completion and validation
//! - `ast`: statement and expression nodes
//!
//! # Examples
//!
//! ```
//! use deker_shell::parser::{Parser, StatementKind};
//!
//! let statements = Parser::parse("use('weather'); collection.name").unwrap();
//! assert_eq!(statements.len(), 2);
//! assert!(matches!(statements[1].kind, StatementKind::Expr(_)));
//! ```

mod ast;
mod lexer;

pub use ast::*;
pub use lexer::{Lexer, Token, TokenKind};

use crate::error::{ParseError, Result, ShellError};

/// Recursive descent parser over the lexer's token stream
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a new parser from input string
    pub fn new(input: &str) -> Self {
        Self {
            tokens: Lexer::tokenize(input),
            pos: 0,
        }
    }

    /// Parse a whole input into statements
    pub fn parse(input: &str) -> Result<Vec<Statement>> {
        Self::new(input).parse_program()
    }

    fn parse_program(&mut self) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();

        loop {
            while self.match_token(&TokenKind::Newline) || self.match_token(&TokenKind::Semicolon)
            {}
            if self.check(&TokenKind::Eof) {
                break;
            }

            statements.push(self.parse_statement()?);

            if !(self.check(&TokenKind::Newline)
                || self.check(&TokenKind::Semicolon)
                || self.check(&TokenKind::Eof))
            {
                return Err(self.unexpected("end of statement"));
            }
        }

        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        let start = self.current_pos();

        if let (Some(TokenKind::Ident(name)), Some(TokenKind::Equals)) =
            (self.kind_at(0), self.kind_at(1))
        {
            let target = name.clone();
            self.advance();
            self.advance();
            let value = self.parse_expression()?;
            return Ok(Statement {
                kind: StatementKind::Assign { target, value },
                span: start..self.previous_pos(),
            });
        }

        let expr = self.parse_expression()?;
        Ok(Statement {
            kind: StatementKind::Expr(expr),
            span: start..self.previous_pos(),
        })
    }

    fn parse_expression(&mut self) -> Result<Expr> {
        self.parse_unary()
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.match_token(&TokenKind::Minus) {
            let operand = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(operand)));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.match_token(&TokenKind::Dot) {
                let name = self.expect_identifier("attribute name after '.'")?;
                expr = Expr::attribute(expr, name);
            } else if self.match_token(&TokenKind::LParen) {
                let (args, kwargs) = self.parse_arguments()?;
                self.expect_token(&TokenKind::RParen, "')' after arguments")?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    kwargs,
                };
            } else if self.match_token(&TokenKind::LBracket) {
                let index = self.parse_expression()?;
                self.expect_token(&TokenKind::RBracket, "']' after index")?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let Some(token) = self.current() else {
            return Err(ParseError::UnexpectedEnd("expression".to_string()).into());
        };

        let expr = match &token.kind {
            TokenKind::Str {
                terminated: false, ..
            } => return Err(ParseError::UnterminatedString.into()),
            TokenKind::Str { value, .. } => Expr::Str(value.clone()),
            TokenKind::Int(n) => Expr::Int(
                n.parse()
                    .map_err(|_| ParseError::InvalidLiteral(n.clone()))?,
            ),
            TokenKind::Float(n) => Expr::Float(
                n.parse()
                    .map_err(|_| ParseError::InvalidLiteral(n.clone()))?,
            ),
            TokenKind::Ident(name) => match name.as_str() {
                "True" => Expr::Bool(true),
                "False" => Expr::Bool(false),
                "None" => Expr::None,
                _ => Expr::Name(name.clone()),
            },
            TokenKind::LBracket => {
                self.advance();
                return self.parse_list();
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_token(&TokenKind::RParen, "')' after expression")?;
                return Ok(expr);
            }
            _ => return Err(self.unexpected("expression")),
        };

        self.advance();
        Ok(expr)
    }

    /// Parse list elements after the opening bracket
    fn parse_list(&mut self) -> Result<Expr> {
        let mut elements = Vec::new();

        while !self.check(&TokenKind::RBracket) {
            elements.push(self.parse_expression()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_token(&TokenKind::RBracket, "']' after list")?;
        Ok(Expr::List(elements))
    }

    /// Parse call arguments: positional first, then `key=value`
    fn parse_arguments(&mut self) -> Result<(Vec<Expr>, Vec<(String, Expr)>)> {
        let mut args = Vec::new();
        let mut kwargs = Vec::new();

        while !self.check(&TokenKind::RParen) {
            if let (Some(TokenKind::Ident(name)), Some(TokenKind::Equals)) =
                (self.kind_at(0), self.kind_at(1))
            {
                let name = name.clone();
                self.advance();
                self.advance();
                kwargs.push((name, self.parse_expression()?));
            } else if kwargs.is_empty() {
                args.push(self.parse_expression()?);
            } else {
                return Err(ParseError::UnexpectedToken {
                    expected: "keyword argument".to_string(),
                    found: "positional argument".to_string(),
                }
                .into());
            }

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        Ok((args, kwargs))
    }

    // Token manipulation methods

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn kind_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.current()
            .is_some_and(|t| std::mem::discriminant(&t.kind) == std::mem::discriminant(kind))
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn expect_token(&mut self, kind: &TokenKind, expected: &str) -> Result<()> {
        if self.match_token(kind) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_identifier(&mut self, expected: &str) -> Result<String> {
        match self.kind_at(0) {
            Some(TokenKind::Ident(name)) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn unexpected(&self, expected: &str) -> ShellError {
        match self.kind_at(0) {
            None | Some(TokenKind::Eof) => ParseError::UnexpectedEnd(expected.to_string()).into(),
            Some(TokenKind::Str {
                terminated: false, ..
            }) => ParseError::UnterminatedString.into(),
            Some(found) => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: found.to_string(),
            }
            .into(),
        }
    }

    fn current_pos(&self) -> usize {
        self.current().map(|t| t.span.start).unwrap_or(0)
    }

    fn previous_pos(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span.end)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_expr(input: &str) -> Expr {
        let mut statements = Parser::parse(input).unwrap();
        assert_eq!(statements.len(), 1);
        match statements.remove(0).kind {
            StatementKind::Expr(expr) => expr,
            other => panic!("expected expression, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_call_with_kwargs() {
        let expr = parse_expr("Client('file:///tmp/', workers=4, loglevel='DEBUG')");
        match expr {
            Expr::Call {
                callee,
                args,
                kwargs,
            } => {
                assert_eq!(*callee, Expr::Name("Client".to_string()));
                assert_eq!(args, vec![Expr::Str("file:///tmp/".to_string())]);
                assert_eq!(kwargs.len(), 2);
                assert_eq!(kwargs[0], ("workers".to_string(), Expr::Int(4)));
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_attribute_chain_and_index() {
        let expr = parse_expr("collections[0].name");
        assert_eq!(
            expr,
            Expr::attribute(
                Expr::Index {
                    object: Box::new(Expr::Name("collections".to_string())),
                    index: Box::new(Expr::Int(0)),
                },
                "name"
            )
        );
    }

    #[test]
    fn test_parse_assignment() {
        let statements = Parser::parse("c = client.get_collection('a')").unwrap();
        assert!(matches!(
            &statements[0].kind,
            StatementKind::Assign { target, .. } if target == "c"
        ));
        assert_eq!(statements[0].span, 0..30);
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse_expr("True"), Expr::Bool(true));
        assert_eq!(parse_expr("None"), Expr::None);
        assert_eq!(parse_expr("-2"), Expr::Neg(Box::new(Expr::Int(2))));
        assert_eq!(parse_expr("1.5"), Expr::Float(1.5));
        assert_eq!(
            parse_expr("['a', 1,]"),
            Expr::List(vec![Expr::Str("a".to_string()), Expr::Int(1)])
        );
    }

    #[test]
    fn test_parse_multiple_statements() {
        let statements = Parser::parse("a = 1; b = 2\n\n# comment\nprint(a)").unwrap();
        assert_eq!(statements.len(), 3);
    }

    #[test]
    fn test_multiline_call() {
        let statements = Parser::parse("print(\n  'a',\n  'b'\n)").unwrap();
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Parser::parse("print("),
            Err(ShellError::Parse(ParseError::UnexpectedEnd(_)))
        ));
        assert!(matches!(
            Parser::parse("print('a"),
            Err(ShellError::Parse(ParseError::UnterminatedString))
        ));
        assert!(matches!(
            Parser::parse("a b"),
            Err(ShellError::Parse(ParseError::UnexpectedToken { .. }))
        ));
        assert!(matches!(
            Parser::parse("f(a=1, 2)"),
            Err(ShellError::Parse(ParseError::UnexpectedToken { .. }))
        ));
        assert!(matches!(
            Parser::parse("99999999999999999999"),
            Err(ShellError::Parse(ParseError::InvalidLiteral(_)))
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(Parser::parse("").unwrap().is_empty());
        assert!(Parser::parse("  \n ; \n").unwrap().is_empty());
    }
}
