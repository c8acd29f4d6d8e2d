//! Interactive shell lifecycle
//!
//! Validates the URI, opens the session, runs the REPL and always releases the
//! client afterwards, whatever way the REPL ended.

use std::io::Write;

use tracing::{debug, info, warn};

use crate::client::{Connector, validate_uri};
use crate::config::{ClientOptions, ShellConfig};
use crate::error::Result;
use crate::repl::{ExitReason, LineSource, ReplEngine, ShellConfigurator};
use crate::runtime::help::HELP_START;
use crate::runtime::{Interpreter, Mode};
use crate::session::Session;

/// Printed when the shell terminates
pub const EXIT_MESSAGE: &str = "Exiting...";

/// Run an interactive shell against `uri`
///
/// # Arguments
/// * `connector` - Creates the storage client
/// * `uri` - Storage URI, validated before any connection attempt
/// * `options` - Client constructor options
/// * `config` - REPL appearance and behaviour
/// * `source` - Input lines
/// * `out` - Where results, messages and the banner go
///
/// # Returns
/// * `Result<ExitReason>` - How the REPL ended; URI and connection errors
///   are returned before the REPL starts
pub async fn run_interactive<S, W>(
    connector: &dyn Connector,
    uri: &str,
    options: &ClientOptions,
    config: &ShellConfig,
    source: S,
    out: &mut W,
) -> Result<ExitReason>
where
    S: LineSource,
    W: Write,
{
    validate_uri(uri)?;

    let mut session = Session::new();
    session.connect(connector, uri, options).await?;
    info!(uri, "Shell session opened");

    let result = run_session(&mut session, connector, options, config, source, out).await;

    let closed = session.close().await;
    debug!(closed, "Shell session finished");
    if let Err(e) = writeln!(out, "{}", EXIT_MESSAGE) {
        warn!("Failed to write exit message: {}", e);
    }

    result
}

async fn run_session<S, W>(
    session: &mut Session,
    connector: &dyn Connector,
    options: &ClientOptions,
    config: &ShellConfig,
    source: S,
    out: &mut W,
) -> Result<ExitReason>
where
    S: LineSource,
    W: Write,
{
    write!(out, "{}", HELP_START)?;

    let mut interpreter =
        Interpreter::new(session, connector, Mode::Interactive).with_client_defaults(options.clone());
    let configurator = ShellConfigurator::new(config.clone());
    let mut engine = ReplEngine::embed(interpreter.scope(), source, |settings| {
        configurator.configure(settings)
    })?;

    engine.run(&mut interpreter, out).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::client::StorageClient;
    use crate::client::mock::MockConnector;
    use crate::config::ColorScheme;
    use crate::error::{ConnectionError, ShellError};
    use crate::repl::{ReadOutcome, ReplSettings, ScriptedSource};

    const URI: &str = "file:///tmp/deker-shell";

    fn config() -> ShellConfig {
        ShellConfig {
            color_scheme: ColorScheme::Monochrome,
            ..ShellConfig::default()
        }
    }

    async fn run(connector: &MockConnector, lines: &[&str]) -> (Result<ExitReason>, String) {
        let mut out = Vec::new();
        let result = run_interactive(
            connector,
            URI,
            &ClientOptions::default(),
            &config(),
            ScriptedSource::new(lines.iter().copied()),
            &mut out,
        )
        .await;
        (result, String::from_utf8(out).unwrap())
    }

    struct RefusingConnector;

    #[async_trait]
    impl Connector for RefusingConnector {
        async fn connect(&self, uri: &str, _: &ClientOptions) -> Result<Box<dyn StorageClient>> {
            Err(ConnectionError::ConnectFailed {
                uri: uri.to_string(),
                reason: "refused".to_string(),
            }
            .into())
        }
    }

    struct BrokenSource;

    impl LineSource for BrokenSource {
        fn apply(&mut self, _: &ReplSettings) -> Result<()> {
            Ok(())
        }

        fn read_line(&mut self, _: Option<&str>) -> Result<ReadOutcome> {
            Err(ShellError::Generic("terminal lost".to_string()))
        }

        fn confirm(&mut self, _: &str) -> Result<bool> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_end_of_input_closes_once() {
        let connector = MockConnector::with_collections(&["a"]);
        let (result, output) = run(&connector, &[]).await;

        assert_eq!(result.unwrap(), ExitReason::EndOfInput);
        assert_eq!(connector.counts.connects(), 1);
        assert_eq!(connector.counts.closes(), 1);
        assert!(output.starts_with(HELP_START));
        assert!(output.ends_with("Exiting...\n"));
    }

    #[tokio::test]
    async fn test_use_switches_and_reports_missing() {
        let connector = MockConnector::with_collections(&["a", "b"]);
        let (result, output) = run(
            &connector,
            &["collections", "use('a')", "use('missing')", "collection.name"],
        )
        .await;

        assert!(result.is_ok());
        let lines: Vec<&str> = output[HELP_START.len()..].lines().collect();
        assert_eq!(
            lines,
            [
                "['a', 'b']",
                "Saved a to 'collection' variable",
                "Collection missing doesn't exist",
                "'a'",
                "Exiting...",
            ]
        );
    }

    #[tokio::test]
    async fn test_exit_call_closes_once() {
        let connector = MockConnector::with_collections(&[]);
        let (result, _) = run(&connector, &["exit()"]).await;

        assert_eq!(result.unwrap(), ExitReason::ExitCalled);
        assert_eq!(connector.counts.closes(), 1);
    }

    #[tokio::test]
    async fn test_close_error_is_swallowed() {
        let connector = MockConnector {
            fail_close: true,
            ..MockConnector::with_collections(&["a"])
        };
        let (result, output) = run(&connector, &["use('a')"]).await;

        assert!(result.is_ok());
        assert_eq!(connector.counts.closes(), 1);
        assert!(output.ends_with("Exiting...\n"));
    }

    #[tokio::test]
    async fn test_repl_failure_still_closes() {
        let connector = MockConnector::with_collections(&[]);
        let mut out = Vec::new();
        let result = run_interactive(
            &connector,
            URI,
            &ClientOptions::default(),
            &config(),
            BrokenSource,
            &mut out,
        )
        .await;

        assert!(matches!(result, Err(ShellError::Generic(_))));
        assert_eq!(connector.counts.closes(), 1);
        assert!(String::from_utf8(out).unwrap().ends_with("Exiting...\n"));
    }

    #[tokio::test]
    async fn test_invalid_uri_constructs_no_client() {
        let connector = MockConnector::with_collections(&[]);
        let mut out = Vec::new();
        let result = run_interactive(
            &connector,
            "not a uri",
            &ClientOptions::default(),
            &config(),
            ScriptedSource::default(),
            &mut out,
        )
        .await;

        assert!(matches!(result, Err(ShellError::InvalidUri(_))));
        assert_eq!(connector.counts.connects(), 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_setup_failure_releases_client() {
        let connector = MockConnector {
            fail_listing: true,
            ..MockConnector::with_collections(&["a"])
        };
        let (result, output) = run(&connector, &["collections"]).await;

        assert!(matches!(
            result,
            Err(ShellError::Connection(ConnectionError::ConnectFailed { .. }))
        ));
        assert_eq!(connector.counts.connects(), 1);
        assert_eq!(connector.counts.closes(), 1);
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_connection_error_propagates() {
        let mut out = Vec::new();
        let result = run_interactive(
            &RefusingConnector,
            URI,
            &ClientOptions::default(),
            &config(),
            ScriptedSource::default(),
            &mut out,
        )
        .await;

        assert!(matches!(
            result,
            Err(ShellError::Connection(ConnectionError::ConnectFailed { .. }))
        ));
        assert!(out.is_empty());
    }
}
