//! Runtime values and their textual representation

use colored_json::prelude::*;
use std::fmt::Write as _;

use super::types::{Builtin, TypeTag};
use crate::client::Collection;

/// Class objects bound in the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Client,
    Collection,
}

impl ClassKind {
    pub fn name(self) -> &'static str {
        match self {
            ClassKind::Client => "Client",
            ClassKind::Collection => "Collection",
        }
    }

    pub fn tag(self) -> TypeTag {
        match self {
            ClassKind::Client => TypeTag::ClientClass,
            ClassKind::Collection => TypeTag::CollectionClass,
        }
    }
}

/// A value produced by evaluating shell input
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Json(serde_json::Value),
    /// Handle to the session's client, carrying its URI
    Client(String),
    Collection(Collection),
    Builtin(Builtin),
    Class(ClassKind),
    /// Method bound to its receiver
    Method { receiver: Box<Value>, name: String },
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Json(a), Value::Json(b)) => a == b,
            (Value::Client(a), Value::Client(b)) => a == b,
            (Value::Collection(a), Value::Collection(b)) => a.name == b.name,
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Class(a), Value::Class(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Type tag used for member lookup and completion
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::None => TypeTag::NoneType,
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Str(_) => TypeTag::Str,
            Value::List(_) => TypeTag::List,
            Value::Json(_) => TypeTag::Json,
            Value::Client(_) => TypeTag::Client,
            Value::Collection(_) => TypeTag::Collection,
            Value::Builtin(b) => TypeTag::Builtin(*b),
            Value::Class(c) => c.tag(),
            Value::Method { .. } => TypeTag::Method,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.tag().name()
    }

    /// Convert a JSON value into the closest shell value
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(_) => Value::Json(value.clone()),
        }
    }

    /// Python-style `repr`
    pub fn repr(&self) -> String {
        match self {
            Value::None => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Str(s) => quote(s),
            Value::List(items) => {
                let mut out = String::from("[");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&item.repr());
                }
                out.push(']');
                out
            }
            Value::Json(json) => serde_json::to_string(json).unwrap_or_default(),
            Value::Client(uri) => format!("<Client {uri}>"),
            Value::Collection(c) => format!("<Collection {}>", quote(&c.name)),
            Value::Builtin(b) => format!("<built-in function {}>", b.name()),
            Value::Class(c) => format!("<class '{}'>", c.name()),
            Value::Method { receiver, name } => {
                format!("<bound method {}.{name}>", receiver.type_name())
            }
        }
    }

    /// Python-style `str`: strings print without quotes
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => other.repr(),
        }
    }

    /// Text echoed for an evaluated expression. Mappings are pretty-printed
    /// and colored when `color` is set.
    pub fn render(&self, color: bool) -> String {
        match self {
            Value::Json(json) => {
                let pretty = serde_json::to_string_pretty(json).unwrap_or_default();
                if color {
                    pretty.to_colored_json_auto().unwrap_or(pretty)
                } else {
                    pretty
                }
            }
            other => other.repr(),
        }
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else if f.is_nan() {
        "nan".to_string()
    } else if f == f64::INFINITY {
        "inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        f.to_string()
    }
}

/// Quote a string the way Python's `repr` does
fn quote(s: &str) -> String {
    let delim = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delim);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(delim);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn test_repr_scalars() {
        assert_eq!(Value::None.repr(), "None");
        assert_eq!(Value::Bool(true).repr(), "True");
        assert_eq!(Value::Int(-3).repr(), "-3");
        assert_eq!(Value::Float(2.0).repr(), "2.0");
        assert_eq!(Value::Float(0.25).repr(), "0.25");
        assert_eq!(Value::Str("it's".to_string()).repr(), "\"it's\"");
        assert_eq!(Value::Str("a\nb".to_string()).repr(), "'a\\nb'");
    }

    #[test]
    fn test_repr_compound() {
        let list = Value::List(vec![Value::Str("a".to_string()), Value::Str("b".to_string())]);
        assert_eq!(list.repr(), "['a', 'b']");
        assert_eq!(list.to_display_string(), "['a', 'b']");

        let collection = Value::Collection(Collection {
            name: "a".to_string(),
            path: PathBuf::from("/tmp/a"),
            metadata: json!({}),
        });
        assert_eq!(collection.repr(), "<Collection 'a'>");
        assert_eq!(
            Value::Client("file:///tmp/".to_string()).repr(),
            "<Client file:///tmp/>"
        );
        assert_eq!(Value::Class(ClassKind::Client).repr(), "<class 'Client'>");
    }

    #[test]
    fn test_display_string_unquoted() {
        assert_eq!(Value::Str("plain".to_string()).to_display_string(), "plain");
    }

    #[test]
    fn test_render_json_without_color() {
        let value = Value::Json(json!({"name": "a"}));
        assert_eq!(value.render(false), "{\n  \"name\": \"a\"\n}");
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Value::from_json(&json!(1)), Value::Int(1));
        assert_eq!(
            Value::from_json(&json!(["x", null])),
            Value::List(vec![Value::Str("x".to_string()), Value::None])
        );
        assert!(matches!(Value::from_json(&json!({"a": 1})), Value::Json(_)));
    }
}
