//! Configuration for the Deker shell
//!
//! The shell reads no configuration file. Settings come from two sources:
//! 1. Command-line arguments (client tuning options, log level)
//! 2. Default values defined here
//!
//! [`ClientOptions`] is what gets forwarded to the storage client constructor,
//! [`ShellConfig`] drives the REPL cosmetics and [`LoggingConfig`] the tracing
//! subscriber.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Storage client constructor options
    #[serde(default)]
    pub client: ClientOptions,

    /// REPL configuration
    #[serde(default)]
    pub shell: ShellConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Options forwarded to the storage client constructor.
///
/// Unset options are skipped on serialization so that they are omitted from
/// the constructor call instead of being passed as defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientOptions {
    /// Number of worker threads used by the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<u32>,

    /// Seconds to wait for a write lock
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_lock_timeout: Option<u64>,

    /// Seconds between write lock checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_lock_check_interval: Option<u64>,

    /// Client log level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loglevel: Option<String>,

    /// Memory limit in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<u64>,

    /// Additional keyword arguments forwarded verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// REPL appearance and behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Input prompt glyph
    #[serde(default = "default_in_prompt")]
    pub in_prompt: String,

    /// Continuation prompt for multi-line input
    #[serde(default = "default_continuation_prompt")]
    pub continuation_prompt: String,

    /// Prefix printed before evaluation results
    #[serde(default)]
    pub out_prompt: String,

    /// Window and terminal title
    #[serde(default = "default_title")]
    pub title: String,

    /// Ask before leaving on end of input
    #[serde(default)]
    pub confirm_exit: bool,

    /// Show the status bar
    #[serde(default)]
    pub show_status_bar: bool,

    /// Color scheme for highlighting and completion menus
    #[serde(default)]
    pub color_scheme: ColorScheme,

    /// Command history
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Available color schemes
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// Low-contrast warm palette
    #[default]
    Zenburn,
    /// No colors at all
    Monochrome,
}

/// Command history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of history entries
    #[serde(default = "default_max_history_size")]
    pub max_size: usize,

    /// Path to history file
    #[serde(default = "default_history_file")]
    pub file_path: PathBuf,

    /// Enable history persistence
    #[serde(default = "default_persist_history")]
    pub persist: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default)]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_in_prompt() -> String {
    ">".to_string()
}

fn default_continuation_prompt() -> String {
    "...".to_string()
}

fn default_title() -> String {
    "Deker shell".to_string()
}

fn default_max_history_size() -> usize {
    1000
}

fn default_history_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".deker_shell_history")
}

fn default_persist_history() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            in_prompt: default_in_prompt(),
            continuation_prompt: default_continuation_prompt(),
            out_prompt: String::new(),
            title: default_title(),
            confirm_exit: false,
            show_status_bar: false,
            color_scheme: ColorScheme::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_history_size(),
            file_path: default_history_file(),
            persist: default_persist_history(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: false,
        }
    }
}

impl ClientOptions {
    /// Keyword arguments for the client constructor, unset options omitted.
    pub fn to_kwargs(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Forward an extra `key value` pair.
    ///
    /// Dotted keys become nested maps (`outer.inner` → `{outer: {inner: value}}`)
    /// and pairs sharing a prefix are merged. Dashes become underscores so that
    /// `--some-key` and `--some_key` land on the same keyword.
    pub fn insert_extra(&mut self, key: &str, value: String) -> Result<(), ConfigError> {
        let key = key.trim_start_matches('-').replace('-', "_");
        let parts: Vec<&str> = key.split('.').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(ConfigError::InvalidParameter(format!("malformed key '{key}'")));
        }

        let (first, rest) = parts
            .split_first()
            .ok_or_else(|| ConfigError::InvalidParameter("empty key".to_string()))?;

        let mut nested = Value::String(value);
        for part in rest.iter().rev() {
            let mut map = Map::new();
            map.insert(part.to_string(), nested);
            nested = Value::Object(map);
        }
        merge_extra(&mut self.extra, first, nested);
        Ok(())
    }
}

/// Insert `value` under `key`, merging into an existing mapping when both are maps
fn merge_extra(target: &mut Map<String, Value>, key: &str, value: Value) {
    match value {
        Value::Object(incoming) => {
            let slot = target
                .entry(key.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            match slot {
                Value::Object(existing) => {
                    for (k, v) in incoming {
                        merge_extra(existing, &k, v);
                    }
                }
                other => *other = Value::Object(incoming),
            }
        }
        value => {
            target.insert(key.to_string(), value);
        }
    }
}

/// Parse a human-readable size (`1024`, `512K`, `64MB`, `4G`, `1T`) into bytes.
///
/// Units are powers of 1024 and case-insensitive.
pub fn parse_size(input: &str) -> Result<u64, ConfigError> {
    let trimmed = input.trim();
    let upper = trimmed.to_ascii_uppercase();
    let without_b = upper.strip_suffix('B').unwrap_or(&upper);

    let (digits, multiplier) = match without_b.chars().last() {
        Some('K') => (&without_b[..without_b.len() - 1], 1u64 << 10),
        Some('M') => (&without_b[..without_b.len() - 1], 1u64 << 20),
        Some('G') => (&without_b[..without_b.len() - 1], 1u64 << 30),
        Some('T') => (&without_b[..without_b.len() - 1], 1u64 << 40),
        Some(c) if c.is_ascii_digit() => (without_b, 1u64),
        _ => return Err(ConfigError::InvalidSize(input.to_string())),
    };

    let number: u64 = digits
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidSize(input.to_string()))?;

    number
        .checked_mul(multiplier)
        .ok_or_else(|| ConfigError::InvalidSize(input.to_string()))
}

impl LogLevel {
    /// Parse a level name, accepting the client's spelling (`WARNING`, `CRITICAL`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "error" | "critical" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
