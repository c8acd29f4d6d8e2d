//! Command-line interface for the Deker shell
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Forwarding unrecognized `--key value` pairs to the client constructor
//! - Mode selection (interactive vs script execution)

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::path::{Path, PathBuf};

use crate::config::{Config, LogLevel, parse_size};
use crate::error::Result;
use crate::script::ScriptLoader;

/// Deker Shell - interactive console for Deker array storage
#[derive(Parser, Debug)]
#[command(
    name = "deker-shell",
    version,
    about = "Interactive shell for Deker array storage",
    long_about = "Interactive shell for Deker array storage.

Unrecognized `--key value` options are passed to the client constructor;
dotted keys such as `--outer.inner value` become nested mappings."
)]
pub struct CliArgs {
    /// Storage URI, or a path to a `.dsh` script to run instead of the shell
    #[arg(value_name = "URI")]
    pub uri: String,

    /// Number of client worker threads
    #[arg(short = 'w', long, value_name = "COUNT")]
    pub workers: Option<u32>,

    /// Seconds to wait for a write lock
    #[arg(short = 't', long, value_name = "SECONDS")]
    pub write_lock_timeout: Option<u64>,

    /// Seconds between write lock checks
    #[arg(short = 'c', long, value_name = "SECONDS")]
    pub write_lock_check_interval: Option<u64>,

    /// Log level (error, warning, info, debug, trace)
    #[arg(short = 'l', long, value_name = "LEVEL")]
    pub loglevel: Option<String>,

    /// Client memory limit, e.g. 512M or 4G
    #[arg(short = 'm', long, value_name = "SIZE", value_parser = parse_memory_limit)]
    pub memory_limit: Option<u64>,
}

fn parse_memory_limit(input: &str) -> std::result::Result<u64, String> {
    parse_size(input).map_err(|e| e.to_string())
}

/// What the process was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Start the REPL against a storage URI
    Interactive(String),
    /// Run a script file and exit
    Script(PathBuf),
}

/// CLI interface handler
#[derive(Debug)]
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Configuration assembled from the arguments
    config: Config,
}

impl CliInterface {
    /// Parse the process arguments
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        Self::try_from_args(std::env::args_os().map(|a| a.to_string_lossy().into_owned()))
    }

    /// Parse an explicit argument list; the first item is the program name
    ///
    /// # Arguments
    /// * `args` - Program name followed by its arguments
    ///
    /// # Returns
    /// * `Result<Self>` - Parsed interface, or `ShellError::Usage` for
    ///   argument-parser errors (including `--help` and `--version`)
    pub fn try_from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let argv: Vec<String> = args.into_iter().map(Into::into).collect();
        let (known, extra) = split_extra_params(&argv)?;
        let args = CliArgs::try_parse_from(known)?;
        let config = Self::build_config(&args, extra)?;

        Ok(Self { args, config })
    }

    /// Build configuration from parsed arguments and forwarded pairs
    ///
    /// # Arguments
    /// * `args` - Parsed arguments
    /// * `extra` - Unrecognized `--key value` pairs in command-line order
    ///
    /// # Returns
    /// * `Result<Config>` - Configuration or a malformed extra key
    fn build_config(args: &CliArgs, extra: Vec<(String, String)>) -> Result<Config> {
        let mut config = Config::default();

        config.client.workers = args.workers;
        config.client.write_lock_timeout = args.write_lock_timeout;
        config.client.write_lock_check_interval = args.write_lock_check_interval;
        config.client.loglevel = args.loglevel.clone();
        config.client.memory_limit = args.memory_limit;

        for (key, value) in extra {
            config.client.insert_extra(&key, value)?;
        }

        if let Some(level) = args.loglevel.as_deref().and_then(LogLevel::parse) {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Decide between the interactive shell and script mode
    pub fn run_mode(&self) -> RunMode {
        let path = Path::new(&self.args.uri);
        if ScriptLoader::has_script_extension(path) {
            RunMode::Script(path.to_path_buf())
        } else {
            RunMode::Interactive(self.args.uri.clone())
        }
    }

    /// Get the configuration
    ///
    /// # Returns
    /// * `&Config` - Reference to configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    ///
    /// # Returns
    /// * `&CliArgs` - Reference to arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }
}

/// Separate long options clap knows about from pairs meant for the client
///
/// Accepts `--key value` and `--key=value`. Everything after a bare `--` is
/// left to clap.
///
/// # Arguments
/// * `argv` - Program name followed by its arguments
///
/// # Returns
/// * `Result<(Vec<String>, Vec<(String, String)>)>` - Arguments for clap and
///   the forwarded pairs, or a usage error when a forwarded key has no value
pub fn split_extra_params(argv: &[String]) -> Result<(Vec<String>, Vec<(String, String)>)> {
    let command = CliArgs::command();
    let is_known = |name: &str| {
        name == "help"
            || name == "version"
            || command
                .get_arguments()
                .any(|arg| arg.get_long() == Some(name))
    };

    let mut known = Vec::with_capacity(argv.len());
    let mut extra = Vec::new();
    let mut iter = argv.iter();

    while let Some(arg) = iter.next() {
        if arg == "--" {
            known.push(arg.clone());
            known.extend(iter.by_ref().cloned());
            break;
        }

        let Some(option) = arg.strip_prefix("--") else {
            known.push(arg.clone());
            continue;
        };

        let (name, inline_value) = match option.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (option, None),
        };

        if is_known(name) {
            known.push(arg.clone());
            continue;
        }

        let value = match inline_value {
            Some(value) => value,
            None => iter.next().cloned().ok_or_else(|| {
                CliArgs::command().error(
                    ErrorKind::InvalidValue,
                    format!("a value is required for '--{name}' but none was supplied"),
                )
            })?,
        };
        extra.push((name.to_string(), value));
    }

    Ok((known, extra))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShellError;
    use serde_json::json;

    fn parse(args: &[&str]) -> Result<CliInterface> {
        CliInterface::try_from_args(args.iter().copied())
    }

    #[test]
    fn test_cli_args_parsing() {
        let cli = parse(&["deker-shell", "file:///tmp/db"]).unwrap();
        assert_eq!(cli.args().uri, "file:///tmp/db");
        assert!(cli.args().workers.is_none());
        assert!(cli.config().client.to_kwargs().is_empty());
    }

    #[test]
    fn test_cli_args_with_options() {
        let cli = parse(&[
            "deker-shell",
            "file:///tmp/db",
            "-w",
            "4",
            "--write-lock-timeout",
            "30",
            "-c",
            "2",
            "--loglevel",
            "DEBUG",
            "-m",
            "512M",
        ])
        .unwrap();

        let client = &cli.config().client;
        assert_eq!(client.workers, Some(4));
        assert_eq!(client.write_lock_timeout, Some(30));
        assert_eq!(client.write_lock_check_interval, Some(2));
        assert_eq!(client.loglevel.as_deref(), Some("DEBUG"));
        assert_eq!(client.memory_limit, Some(512 * 1024 * 1024));
        assert_eq!(cli.config().logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_unset_options_are_omitted() {
        let cli = parse(&["deker-shell", "file:///tmp/db", "-w", "2"]).unwrap();
        let kwargs = cli.config().client.to_kwargs();
        assert_eq!(kwargs.len(), 1);
        assert_eq!(kwargs["workers"], json!(2));
    }

    #[test]
    fn test_extra_params_are_forwarded() {
        let cli = parse(&[
            "deker-shell",
            "file:///tmp/db",
            "--outer.inner",
            "1",
            "--outer.other=x",
            "--flat-key",
            "v",
            "-w",
            "3",
        ])
        .unwrap();

        let kwargs = cli.config().client.to_kwargs();
        assert_eq!(kwargs["outer"], json!({"inner": "1", "other": "x"}));
        assert_eq!(kwargs["flat_key"], json!("v"));
        assert_eq!(kwargs["workers"], json!(3));
    }

    #[test]
    fn test_split_keeps_known_options() {
        let argv: Vec<String> = ["deker-shell", "--workers=2", "--foo", "bar", "uri"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let (known, extra) = split_extra_params(&argv).unwrap();
        assert_eq!(known, ["deker-shell", "--workers=2", "uri"]);
        assert_eq!(extra, [("foo".to_string(), "bar".to_string())]);
    }

    #[test]
    fn test_extra_param_without_value_is_usage_error() {
        let err = parse(&["deker-shell", "file:///tmp/db", "--dangling"]).unwrap_err();
        match err {
            ShellError::Usage(e) => assert_eq!(e.kind(), ErrorKind::InvalidValue),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_uri_is_usage_error() {
        let err = parse(&["deker-shell"]).unwrap_err();
        match err {
            ShellError::Usage(e) => {
                assert_eq!(e.kind(), ErrorKind::MissingRequiredArgument);
                assert_eq!(e.exit_code(), 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bad_memory_limit_is_rejected() {
        assert!(matches!(
            parse(&["deker-shell", "file:///tmp/db", "-m", "lots"]),
            Err(ShellError::Usage(_))
        ));
    }

    #[test]
    fn test_run_mode() {
        let cli = parse(&["deker-shell", "setup.dsh"]).unwrap();
        assert_eq!(cli.run_mode(), RunMode::Script(PathBuf::from("setup.dsh")));

        let cli = parse(&["deker-shell", "file:///tmp/db"]).unwrap();
        assert_eq!(
            cli.run_mode(),
            RunMode::Interactive("file:///tmp/db".to_string())
        );
    }

    #[test]
    fn test_unknown_loglevel_keeps_default() {
        let cli = parse(&["deker-shell", "file:///tmp/db", "-l", "loud"]).unwrap();
        assert_eq!(cli.config().logging.level, LogLevel::Warn);
        assert_eq!(cli.config().client.loglevel.as_deref(), Some("loud"));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        CliArgs::command().debug_assert();
    }
}
