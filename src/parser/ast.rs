//! Syntax tree of the shell language

use std::ops::Range;

/// Span information for source locations (character offsets)
pub type Span = Range<usize>;

/// A top-level statement
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// `name = expr`
    Assign { target: String, value: Expr },
    /// Bare expression; its value is echoed in interactive mode
    Expr(Expr),
}

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Expr>),
    /// Variable reference
    Name(String),
    /// `object.name`
    Attribute { object: Box<Expr>, name: String },
    /// `callee(args, key=value)`
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    },
    /// `object[index]`
    Index { object: Box<Expr>, index: Box<Expr> },
    /// `-operand`
    Neg(Box<Expr>),
}

impl Expr {
    /// Build an attribute access node
    pub fn attribute(object: Expr, name: impl Into<String>) -> Self {
        Expr::Attribute {
            object: Box::new(object),
            name: name.into(),
        }
    }
}
