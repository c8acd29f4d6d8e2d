use std::{fmt, io};

/// Crate-wide `Result` type using [`ShellError`] as the error.
pub type Result<T> = std::result::Result<T, ShellError>;

/// Top-level error type for shell operations.
#[derive(Debug)]
pub enum ShellError {
    /// URI failed validation; no connection was attempted.
    InvalidUri(String),

    /// Command-line usage error reported by the argument parser.
    Usage(clap::Error),

    /// Storage client could not be constructed.
    Connection(ConnectionError),

    /// Failure reported by an open storage client.
    Storage(StorageError),

    /// Shell input could not be parsed.
    Parse(ParseError),

    /// Shell input failed while evaluating.
    Eval(EvalError),

    /// Script mode errors.
    Script(ScriptError),

    /// Malformed configuration values.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Errors raised while opening a storage client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The URI scheme has no client backend in this build.
    UnsupportedScheme(String),

    /// The backend refused the connection.
    ConnectFailed { uri: String, reason: String },

    /// The backend returned a client that is already closed.
    ClientClosed,

    /// A session already holds an open client.
    AlreadyOpen,

    /// The session has no open client.
    NotOpen,
}

/// Errors raised by an open storage client.
#[derive(Debug)]
pub enum StorageError {
    /// Operation on a closed client.
    Closed,

    /// Collection name is not usable as a directory name.
    InvalidName(String),

    /// A collection with this name already exists.
    CollectionExists(String),

    /// Collection metadata could not be read back.
    Corrupted { path: String, reason: String },

    /// Underlying filesystem failure.
    Io(io::Error),
}

/// Parsing errors for shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unexpected token while parsing.
    UnexpectedToken { expected: String, found: String },

    /// Input ended in the middle of an expression.
    UnexpectedEnd(String),

    /// A literal could not be converted.
    InvalidLiteral(String),

    /// String literal without closing quote.
    UnterminatedString,
}

/// Evaluation errors for shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Name is not bound.
    NameError(String),

    /// Type has no such attribute.
    AttributeError { type_name: String, attribute: String },

    /// Operation applied to a value of the wrong type.
    TypeError(String),

    /// Index outside the bounds of a sequence.
    IndexError(String),

    /// Preset binding cannot be reassigned.
    ReadOnly(String),
}

/// Script execution errors.
#[derive(Debug)]
pub enum ScriptError {
    /// Script file not found.
    FileNotFound(String),

    /// Script file exceeds the size limit.
    TooLarge { size: u64, max: u64 },

    /// Script file is not valid UTF-8.
    InvalidEncoding(String),

    /// A statement failed.
    Failed { line: usize, message: String },
}

/// Configuration value errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Size string could not be parsed.
    InvalidSize(String),

    /// Forwarded `--key value` pair is malformed.
    InvalidParameter(String),

    /// Option value is out of range.
    InvalidValue { field: String, value: String },
}

/// Failures of the completion analysis engine.
///
/// These never propagate past the completion pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// Cursor row or column lies outside the request text.
    CursorOutOfRange { row: usize, column: usize },

    /// The analysis could not resolve the expression.
    Analysis(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::InvalidUri(msg) => write!(f, "Invalid URI: {msg}"),
            ShellError::Usage(e) => write!(f, "{e}"),
            ShellError::Connection(e) => write!(f, "Connection error: {e}"),
            ShellError::Storage(e) => write!(f, "Storage error: {e}"),
            ShellError::Parse(e) => write!(f, "SyntaxError: {e}"),
            ShellError::Eval(e) => write!(f, "{e}"),
            ShellError::Script(e) => write!(f, "Script error: {e}"),
            ShellError::Config(e) => write!(f, "Configuration error: {e}"),
            ShellError::Io(e) => write!(f, "I/O error: {e}"),
            ShellError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::UnsupportedScheme(scheme) => {
                write!(f, "No client backend for scheme '{scheme}'")
            }
            ConnectionError::ConnectFailed { uri, reason } => {
                write!(f, "Failed to connect to {uri}: {reason}")
            }
            ConnectionError::ClientClosed => write!(f, "Client is closed"),
            ConnectionError::AlreadyOpen => {
                write!(f, "A client is already open in this shell, use 'client'")
            }
            ConnectionError::NotOpen => write!(f, "No client is open"),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Closed => write!(f, "Client is closed"),
            StorageError::InvalidName(name) => write!(f, "Invalid collection name: '{name}'"),
            StorageError::CollectionExists(name) => {
                write!(f, "Collection {name} already exists")
            }
            StorageError::Corrupted { path, reason } => {
                write!(f, "Unreadable collection metadata {path}: {reason}")
            }
            StorageError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedToken { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            ParseError::UnexpectedEnd(expected) => {
                write!(f, "unexpected end of input, expected {expected}")
            }
            ParseError::InvalidLiteral(lit) => write!(f, "invalid literal {lit}"),
            ParseError::UnterminatedString => write!(f, "unterminated string literal"),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::NameError(name) => write!(f, "NameError: name '{name}' is not defined"),
            EvalError::AttributeError {
                type_name,
                attribute,
            } => write!(
                f,
                "AttributeError: '{type_name}' object has no attribute '{attribute}'"
            ),
            EvalError::TypeError(msg) => write!(f, "TypeError: {msg}"),
            EvalError::IndexError(msg) => write!(f, "IndexError: {msg}"),
            EvalError::ReadOnly(name) => write!(
                f,
                "'{name}' is a preset variable and cannot be reassigned"
            ),
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::FileNotFound(path) => write!(f, "Script file not found: {path}"),
            ScriptError::TooLarge { size, max } => {
                write!(f, "Script file too large: {size} bytes (max: {max} bytes)")
            }
            ScriptError::InvalidEncoding(path) => {
                write!(f, "Script file is not valid UTF-8: {path}")
            }
            ScriptError::Failed { line, message } => write!(f, "line {line}: {message}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSize(value) => write!(f, "Invalid size '{value}'"),
            ConfigError::InvalidParameter(msg) => write!(f, "Invalid parameter: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for '{field}'")
            }
        }
    }
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::CursorOutOfRange { row, column } => {
                write!(f, "Cursor ({row}, {column}) is outside the input")
            }
            CompletionError::Analysis(msg) => write!(f, "Analysis failed: {msg}"),
        }
    }
}

impl std::error::Error for ShellError {}
impl std::error::Error for ConnectionError {}
impl std::error::Error for StorageError {}
impl std::error::Error for ParseError {}
impl std::error::Error for EvalError {}
impl std::error::Error for ScriptError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for CompletionError {}

/* ========================= Conversions to ShellError ========================= */

impl From<io::Error> for ShellError {
    fn from(err: io::Error) -> Self {
        ShellError::Io(err)
    }
}

impl From<clap::Error> for ShellError {
    fn from(err: clap::Error) -> Self {
        ShellError::Usage(err)
    }
}

impl From<ConnectionError> for ShellError {
    fn from(err: ConnectionError) -> Self {
        ShellError::Connection(err)
    }
}

impl From<StorageError> for ShellError {
    fn from(err: StorageError) -> Self {
        ShellError::Storage(err)
    }
}

impl From<ParseError> for ShellError {
    fn from(err: ParseError) -> Self {
        ShellError::Parse(err)
    }
}

impl From<EvalError> for ShellError {
    fn from(err: EvalError) -> Self {
        ShellError::Eval(err)
    }
}

impl From<ScriptError> for ShellError {
    fn from(err: ScriptError) -> Self {
        ShellError::Script(err)
    }
}

impl From<ConfigError> for ShellError {
    fn from(err: ConfigError) -> Self {
        ShellError::Config(err)
    }
}

impl From<String> for ShellError {
    fn from(msg: String) -> Self {
        ShellError::Generic(msg)
    }
}

impl From<&str> for ShellError {
    fn from(msg: &str) -> Self {
        ShellError::Generic(msg.to_owned())
    }
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_error_messages() {
        let err = ShellError::from(EvalError::NameError("foo".to_string()));
        assert_eq!(err.to_string(), "NameError: name 'foo' is not defined");

        let err = ShellError::from(EvalError::AttributeError {
            type_name: "Client".to_string(),
            attribute: "drop".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "AttributeError: 'Client' object has no attribute 'drop'"
        );
    }

    #[test]
    fn test_connection_error_wrapping() {
        let err: ShellError = ConnectionError::UnsupportedScheme("http".to_string()).into();
        assert!(matches!(err, ShellError::Connection(_)));
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn test_script_error_line() {
        let err = ScriptError::Failed {
            line: 3,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "line 3: boom");
    }
}
