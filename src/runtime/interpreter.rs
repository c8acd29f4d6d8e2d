//! Interpreter for the shell language
//!
//! Evaluates parsed statements against a borrowed [`Session`]. Preset names
//! (`client`, `collections`, `collection`) are resolved from the session on
//! every lookup instead of being stored as globals, so `use(name)` is visible
//! everywhere immediately.

use futures::future::{BoxFuture, FutureExt};
use std::collections::BTreeMap;
use tracing::debug;

use super::help::{self, HELP_TEXT};
use super::scope::{ScopeSnapshot, SharedScope};
use super::types::{
    Builtin, CLIENT_DOC, CLIENT_MODULE, COLLECTION_DOC, MAIN_MODULE, MemberKind, SHELL_MODULE,
    TypeTag,
};
use super::value::{ClassKind, Value};
use crate::client::Connector;
use crate::config::{ClientOptions, parse_size};
use crate::error::{ConfigError, EvalError, Result};
use crate::parser::{Expr, Parser, Statement, StatementKind};
use crate::session::{Session, SessionState};

/// Names bound by the shell that cannot be reassigned interactively
pub const PRESET_NAMES: &[&str] = &["client", "collections", "collection"];

/// Execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// REPL with an open session and read-only presets
    Interactive,
    /// Script file; the script opens its own client
    Script,
}

/// Shell language interpreter
pub struct Interpreter<'s> {
    session: &'s mut Session,
    connector: &'s dyn Connector,
    mode: Mode,
    client_defaults: ClientOptions,
    locals: BTreeMap<String, Value>,
    scope: SharedScope,
    output: Vec<String>,
    exit_requested: bool,
}

type Kwargs = Vec<(String, Value)>;

impl<'s> Interpreter<'s> {
    /// Create an interpreter over `session`
    ///
    /// # Arguments
    /// * `session` - Session providing the client and current collection
    /// * `connector` - Used by `Client(...)` when the session is not open yet
    /// * `mode` - Interactive or script execution
    pub fn new(session: &'s mut Session, connector: &'s dyn Connector, mode: Mode) -> Self {
        let interpreter = Self {
            session,
            connector,
            mode,
            client_defaults: ClientOptions::default(),
            locals: BTreeMap::new(),
            scope: SharedScope::new(),
            output: Vec::new(),
            exit_requested: false,
        };
        interpreter.publish_scope();
        interpreter
    }

    /// Options used by `Client(...)` for keywords the call leaves out
    pub fn with_client_defaults(mut self, options: ClientOptions) -> Self {
        self.client_defaults = options;
        self
    }

    /// Publish scope snapshots into an existing shared handle
    pub fn with_scope(mut self, scope: SharedScope) -> Self {
        self.scope = scope;
        self.publish_scope();
        self
    }

    /// Handle the completer reads scope snapshots from
    pub fn scope(&self) -> SharedScope {
        self.scope.clone()
    }

    pub fn session(&self) -> &Session {
        self.session
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether `exit()` or `quit()` was called
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Drain lines printed since the last call
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// Parse and run `source`.
    ///
    /// # Returns
    /// * `Result<Option<Value>>` - Value of a trailing expression statement,
    ///   `None` when there is nothing to echo
    pub async fn execute(&mut self, source: &str) -> Result<Option<Value>> {
        let statements = Parser::parse(source)?;
        let mut last = None;
        let mut result = Ok(());

        for statement in &statements {
            match self.execute_statement(statement).await {
                Ok(value) => last = value,
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        self.publish_scope();
        result.map(|_| last)
    }

    /// Run a single parsed statement
    pub async fn execute_statement(&mut self, statement: &Statement) -> Result<Option<Value>> {
        match &statement.kind {
            StatementKind::Assign { target, value } => {
                if self.mode == Mode::Interactive && PRESET_NAMES.contains(&target.as_str()) {
                    return Err(EvalError::ReadOnly(target.clone()).into());
                }
                let value = self.eval(value).await?;
                debug!(name = %target, type_name = value.type_name(), "Bound name");
                self.locals.insert(target.clone(), value);
                Ok(None)
            }
            StatementKind::Expr(expr) => {
                let value = self.eval(expr).await?;
                Ok(match value {
                    Value::None => None,
                    other => Some(other),
                })
            }
        }
    }

    /// Publish the names currently visible for completion
    pub fn publish_scope(&self) {
        let mut snapshot = ScopeSnapshot::new();

        if self.session.is_open() {
            snapshot.insert("client", TypeTag::Client, SHELL_MODULE);
            snapshot.insert("collections", TypeTag::List, SHELL_MODULE);
        }
        let collection_tag = match self.session.collection() {
            Some(_) => TypeTag::Collection,
            None => TypeTag::NoneType,
        };
        snapshot.insert("collection", collection_tag, SHELL_MODULE);

        for builtin in Builtin::ALL {
            snapshot.insert(builtin.name(), TypeTag::Builtin(builtin), builtin.module());
        }
        snapshot.insert("Client", TypeTag::ClientClass, CLIENT_MODULE);
        snapshot.insert("Collection", TypeTag::CollectionClass, CLIENT_MODULE);

        for (name, value) in &self.locals {
            snapshot.insert(name.clone(), value.tag(), MAIN_MODULE);
        }

        self.scope.publish(snapshot);
    }

    fn eval<'a>(&'a mut self, expr: &'a Expr) -> BoxFuture<'a, Result<Value>> {
        self.eval_expr(expr).boxed()
    }

    async fn eval_expr(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::None => Ok(Value::None),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Int(i) => Ok(Value::Int(*i)),
            Expr::Float(f) => Ok(Value::Float(*f)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item).await?);
                }
                Ok(Value::List(values))
            }
            Expr::Name(name) => self.lookup(name),
            Expr::Attribute { object, name } => {
                let receiver = self.eval(object).await?;
                self.get_attribute(receiver, name)
            }
            Expr::Index { object, index } => {
                let object = self.eval(object).await?;
                let index = self.eval(index).await?;
                index_value(&object, &index)
            }
            Expr::Neg(operand) => match self.eval(operand).await? {
                Value::Int(i) => i
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| EvalError::TypeError("integer overflow".to_string()).into()),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(EvalError::TypeError(format!(
                    "bad operand type for unary -: '{}'",
                    other.type_name()
                ))
                .into()),
            },
            Expr::Call {
                callee,
                args,
                kwargs,
            } => {
                let callee = self.eval(callee).await?;
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.eval(arg).await?);
                }
                let mut kwarg_values = Vec::with_capacity(kwargs.len());
                for (name, arg) in kwargs {
                    kwarg_values.push((name.clone(), self.eval(arg).await?));
                }
                self.call(callee, arg_values, kwarg_values).await
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<Value> {
        if let Some(value) = self.locals.get(name) {
            return Ok(value.clone());
        }

        let value = match name {
            "client" => self.session.uri().map(|uri| Value::Client(uri.to_string())),
            "collections" if self.session.is_open() => Some(Value::List(
                self.session
                    .collection_names()
                    .iter()
                    .map(|n| Value::Str(n.clone()))
                    .collect(),
            )),
            "collection" => Some(self.current_collection()),
            "Client" => Some(Value::Class(ClassKind::Client)),
            "Collection" => Some(Value::Class(ClassKind::Collection)),
            _ => Builtin::from_name(name).map(Value::Builtin),
        };

        value.ok_or_else(|| EvalError::NameError(name.to_string()).into())
    }

    fn current_collection(&self) -> Value {
        self.session
            .collection()
            .cloned()
            .map(Value::Collection)
            .unwrap_or(Value::None)
    }

    fn get_attribute(&self, receiver: Value, name: &str) -> Result<Value> {
        let tag = receiver.tag();
        let member = tag.member(name).ok_or_else(|| EvalError::AttributeError {
            type_name: tag.name().to_string(),
            attribute: name.to_string(),
        })?;

        if member.kind == MemberKind::Method {
            return Ok(Value::Method {
                receiver: Box::new(receiver),
                name: name.to_string(),
            });
        }

        let value = match (&receiver, name) {
            (Value::Client(_), "is_closed") => {
                Value::Bool(self.session.state() == SessionState::Closed)
            }
            (Value::Client(uri), "uri") => Value::Str(uri.clone()),
            (Value::Client(_), "_options") => {
                let options = self.session.client()?.options();
                Value::Json(serde_json::Value::Object(options.to_kwargs()))
            }
            (Value::Client(_), "__class__") => Value::Class(ClassKind::Client),
            (Value::Client(_), "__doc__") => Value::Str(CLIENT_DOC.to_string()),
            (Value::Collection(c), "name") => Value::Str(c.name.clone()),
            (Value::Collection(c), "path") => Value::Str(c.path.display().to_string()),
            (Value::Collection(c), "metadata") => Value::Json(c.metadata.clone()),
            (Value::Collection(_), "__class__") => Value::Class(ClassKind::Collection),
            (Value::Collection(_), "__doc__") => Value::Str(COLLECTION_DOC.to_string()),
            (Value::Class(kind), "__name__") => Value::Str(kind.name().to_string()),
            (Value::Class(ClassKind::Client), "__doc__") => Value::Str(CLIENT_DOC.to_string()),
            (Value::Class(ClassKind::Collection), "__doc__") => {
                Value::Str(COLLECTION_DOC.to_string())
            }
            _ => {
                return Err(EvalError::AttributeError {
                    type_name: tag.name().to_string(),
                    attribute: name.to_string(),
                }
                .into());
            }
        };

        Ok(value)
    }

    async fn call(&mut self, callee: Value, args: Vec<Value>, kwargs: Kwargs) -> Result<Value> {
        match callee {
            Value::Builtin(builtin) => self.call_builtin(builtin, args, kwargs).await,
            Value::Class(ClassKind::Client) => self.open_client(args, kwargs).await,
            Value::Class(ClassKind::Collection) => Err(EvalError::TypeError(
                "Collection objects are created with client.create_collection(name)".to_string(),
            )
            .into()),
            Value::Method { receiver, name } => self.call_method(*receiver, &name, args, kwargs).await,
            other => Err(EvalError::TypeError(format!(
                "'{}' object is not callable",
                other.type_name()
            ))
            .into()),
        }
    }

    async fn call_builtin(
        &mut self,
        builtin: Builtin,
        args: Vec<Value>,
        kwargs: Kwargs,
    ) -> Result<Value> {
        if builtin == Builtin::Print {
            if let Some((key, _)) = kwargs.first() {
                return Err(unexpected_keyword("print", key));
            }
            let line = args
                .iter()
                .map(Value::to_display_string)
                .collect::<Vec<_>>()
                .join(" ");
            self.output.push(line);
            return Ok(Value::None);
        }

        let mut bound = bind_arguments(builtin.name(), builtin.params(), args, kwargs)?;

        match builtin {
            Builtin::Use => {
                let name = expect_str(builtin.name(), "name", bound.remove(0))?;
                let outcome = self.session.use_collection(&name).await?;
                self.output.push(outcome.to_string());
                Ok(Value::None)
            }
            Builtin::GetGlobalCollVariable => Ok(self.current_collection()),
            Builtin::Help => {
                let text = match bound.remove(0) {
                    Some(value) => help::describe(&value),
                    None => HELP_TEXT.to_string(),
                };
                self.output.push(text.trim_end().to_string());
                Ok(Value::None)
            }
            Builtin::Len => {
                let value = bound
                    .remove(0)
                    .ok_or_else(|| missing_argument(builtin.name(), "obj"))?;
                len_of(&value).map(Value::Int)
            }
            Builtin::Exit | Builtin::Quit => {
                self.exit_requested = true;
                Ok(Value::None)
            }
            Builtin::Print => Ok(Value::None),
        }
    }

    async fn open_client(&mut self, args: Vec<Value>, kwargs: Kwargs) -> Result<Value> {
        let mut uri = None;
        let mut rest = Vec::new();
        let mut positional = args.into_iter();

        if let Some(first) = positional.next() {
            uri = Some(first);
        }
        if positional.next().is_some() {
            return Err(EvalError::TypeError(
                "Client() takes 1 positional argument".to_string(),
            )
            .into());
        }
        for (key, value) in kwargs {
            if key == "uri" {
                if uri.is_some() {
                    return Err(EvalError::TypeError(
                        "Client() got multiple values for argument 'uri'".to_string(),
                    )
                    .into());
                }
                uri = Some(value);
            } else {
                rest.push((key, value));
            }
        }

        let uri = expect_str("Client", "uri", uri)?;
        let options = client_options(&self.client_defaults, rest)?;
        self.session.connect(self.connector, &uri, &options).await?;
        Ok(Value::Client(uri))
    }

    async fn call_method(
        &mut self,
        receiver: Value,
        name: &str,
        args: Vec<Value>,
        kwargs: Kwargs,
    ) -> Result<Value> {
        let params = receiver
            .tag()
            .member(name)
            .map(|m| m.params)
            .unwrap_or_default();
        let mut bound = bind_arguments(name, params, args, kwargs)?;

        match (&receiver, name) {
            (Value::Client(_), "get_collection") => {
                let collection_name = expect_str(name, "name", bound.remove(0))?;
                let found = self
                    .session
                    .client()?
                    .get_collection(&collection_name)
                    .await?;
                Ok(found.map(Value::Collection).unwrap_or(Value::None))
            }
            (Value::Client(_), "create_collection") => {
                let collection_name = expect_str(name, "name", bound.remove(0))?;
                let created = self
                    .session
                    .client()?
                    .create_collection(&collection_name)
                    .await?;
                self.session.refresh_collections().await?;
                Ok(Value::Collection(created))
            }
            (Value::Class(kind), "mro") => Ok(Value::List(vec![
                Value::Class(*kind),
                Value::Str("object".to_string()),
            ])),
            (Value::Str(s), "lower") => Ok(Value::Str(s.to_lowercase())),
            (Value::Str(s), "upper") => Ok(Value::Str(s.to_uppercase())),
            (Value::Str(s), "startswith") => {
                let prefix = expect_str(name, "prefix", bound.remove(0))?;
                Ok(Value::Bool(s.starts_with(&prefix)))
            }
            (Value::Str(s), "split") => {
                let parts: Vec<Value> = match bound.remove(0) {
                    Some(Value::Str(sep)) if !sep.is_empty() => {
                        s.split(sep.as_str()).map(|p| Value::Str(p.to_string())).collect()
                    }
                    Some(Value::Str(_)) => {
                        return Err(EvalError::TypeError("empty separator".to_string()).into());
                    }
                    Some(Value::None) | None => s
                        .split_whitespace()
                        .map(|p| Value::Str(p.to_string()))
                        .collect(),
                    Some(other) => {
                        return Err(EvalError::TypeError(format!(
                            "must be str or None, not {}",
                            other.type_name()
                        ))
                        .into());
                    }
                };
                Ok(Value::List(parts))
            }
            (Value::List(items), "count") => {
                let needle = bound.remove(0).ok_or_else(|| missing_argument(name, "value"))?;
                Ok(Value::Int(items.iter().filter(|v| **v == needle).count() as i64))
            }
            (Value::List(items), "index") => {
                let needle = bound.remove(0).ok_or_else(|| missing_argument(name, "value"))?;
                items
                    .iter()
                    .position(|v| *v == needle)
                    .map(|i| Value::Int(i as i64))
                    .ok_or_else(|| {
                        EvalError::IndexError(format!("{} is not in list", needle.repr())).into()
                    })
            }
            (Value::Json(json), "keys") => Ok(Value::List(
                json.as_object()
                    .map(|map| map.keys().map(|k| Value::Str(k.clone())).collect())
                    .unwrap_or_default(),
            )),
            (Value::Json(json), "get") => {
                let key = expect_str(name, "key", bound.remove(0))?;
                Ok(json.get(&key).map(Value::from_json).unwrap_or(Value::None))
            }
            _ => Err(EvalError::AttributeError {
                type_name: receiver.type_name().to_string(),
                attribute: name.to_string(),
            }
            .into()),
        }
    }
}

/// Match positional and keyword arguments against `params`.
///
/// Missing arguments are `None`; the caller decides which are required.
fn bind_arguments(
    function: &str,
    params: &[&str],
    args: Vec<Value>,
    kwargs: Kwargs,
) -> Result<Vec<Option<Value>>> {
    if args.len() > params.len() {
        return Err(EvalError::TypeError(format!(
            "{function}() takes {} positional argument{} but {} were given",
            params.len(),
            if params.len() == 1 { "" } else { "s" },
            args.len()
        ))
        .into());
    }

    let mut bound: Vec<Option<Value>> = vec![None; params.len()];
    for (slot, value) in bound.iter_mut().zip(args) {
        *slot = Some(value);
    }

    for (key, value) in kwargs {
        let index = params
            .iter()
            .position(|p| *p == key)
            .ok_or_else(|| unexpected_keyword(function, &key))?;
        if bound[index].is_some() {
            return Err(EvalError::TypeError(format!(
                "{function}() got multiple values for argument '{key}'"
            ))
            .into());
        }
        bound[index] = Some(value);
    }

    Ok(bound)
}

fn unexpected_keyword(function: &str, key: &str) -> crate::error::ShellError {
    EvalError::TypeError(format!(
        "{function}() got an unexpected keyword argument '{key}'"
    ))
    .into()
}

fn missing_argument(function: &str, param: &str) -> crate::error::ShellError {
    EvalError::TypeError(format!(
        "{function}() missing required argument: '{param}'"
    ))
    .into()
}

fn expect_str(function: &str, param: &str, value: Option<Value>) -> Result<String> {
    match value {
        Some(Value::Str(s)) => Ok(s),
        Some(other) => Err(EvalError::TypeError(format!(
            "{function}() argument '{param}' must be str, not {}",
            other.type_name()
        ))
        .into()),
        None => Err(missing_argument(function, param)),
    }
}

fn len_of(value: &Value) -> Result<i64> {
    let len = match value {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Json(serde_json::Value::Object(map)) => map.len(),
        Value::Json(serde_json::Value::Array(items)) => items.len(),
        other => {
            return Err(EvalError::TypeError(format!(
                "object of type '{}' has no len()",
                other.type_name()
            ))
            .into());
        }
    };
    Ok(len as i64)
}

fn index_value(object: &Value, index: &Value) -> Result<Value> {
    match (object, index) {
        (Value::List(items), Value::Int(i)) => resolve_index(*i, items.len())
            .map(|i| items[i].clone())
            .ok_or_else(|| EvalError::IndexError("list index out of range".to_string()).into()),
        (Value::Str(s), Value::Int(i)) => {
            let chars: Vec<char> = s.chars().collect();
            resolve_index(*i, chars.len())
                .map(|i| Value::Str(chars[i].to_string()))
                .ok_or_else(|| {
                    EvalError::IndexError("string index out of range".to_string()).into()
                })
        }
        (Value::Json(serde_json::Value::Object(map)), Value::Str(key)) => map
            .get(key)
            .map(Value::from_json)
            .ok_or_else(|| EvalError::IndexError(format!("key '{key}' not found")).into()),
        (Value::List(_) | Value::Str(_), other) => Err(EvalError::TypeError(format!(
            "indices must be integers, not {}",
            other.type_name()
        ))
        .into()),
        (other, _) => Err(EvalError::TypeError(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))
        .into()),
    }
}

/// Python-style index resolution, negative counting from the end
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { len + index } else { index };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

/// Build client options from `Client(...)` keywords layered over `defaults`.
///
/// Keywords outside the known constructor parameters are forwarded in
/// `extra` as JSON.
fn client_options(defaults: &ClientOptions, kwargs: Kwargs) -> Result<ClientOptions> {
    let mut options = defaults.clone();

    for (key, value) in kwargs {
        match key.as_str() {
            "workers" => {
                options.workers = Some(
                    u32::try_from(expect_uint(&key, &value)?)
                        .map_err(|_| invalid_value(&key, &value))?,
                )
            }
            "write_lock_timeout" => options.write_lock_timeout = Some(expect_uint(&key, &value)?),
            "write_lock_check_interval" => {
                options.write_lock_check_interval = Some(expect_uint(&key, &value)?)
            }
            "loglevel" => match value {
                Value::Str(level) => options.loglevel = Some(level),
                other => return Err(invalid_value(&key, &other).into()),
            },
            "memory_limit" => {
                options.memory_limit = Some(match &value {
                    Value::Str(size) => parse_size(size)?,
                    _ => expect_uint(&key, &value)?,
                })
            }
            _ => {
                options.extra.insert(key, to_json(&value));
            }
        }
    }

    Ok(options)
}

fn expect_uint(key: &str, value: &Value) -> std::result::Result<u64, ConfigError> {
    match value {
        Value::Int(i) => u64::try_from(*i).map_err(|_| invalid_value(key, value)),
        _ => Err(invalid_value(key, value)),
    }
}

fn invalid_value(key: &str, value: &Value) -> ConfigError {
    ConfigError::InvalidValue {
        field: key.to_string(),
        value: value.repr(),
    }
}

/// JSON form of a value forwarded as an extra client keyword
fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::None => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Json(json) => json.clone(),
        other => serde_json::Value::String(other.repr()),
    }
}
