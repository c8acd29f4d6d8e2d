//! Deker Shell
//!
//! Interactive console for Deker array storage. Opens a client for the given
//! URI and drops into a REPL with `client`, `collections`, `collection` and
//! `use()` preset, or runs a `.dsh` script when given one instead of a URI.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode
//! deker-shell file:///var/lib/deker
//!
//! # Script mode
//! deker-shell setup.dsh
//! ```

use std::io;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use deker_shell::cli::{CliInterface, RunMode};
use deker_shell::client::DefaultConnector;
use deker_shell::error::{Result, ShellError};
use deker_shell::repl::TerminalSource;
use deker_shell::{script, shell};

/// Application entry point
#[tokio::main]
async fn main() {
    match run().await {
        Ok(()) => {}
        // clap prints help/version to stdout and usage errors to stderr
        Err(ShellError::Usage(usage)) => usage.exit(),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments
/// 2. Initialize logging
/// 3. Run the script or start the interactive shell
///
/// # Returns
/// * `Result<()>` - Success or error
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;
    initialize_logging(&cli);

    let connector = DefaultConnector;
    let options = &cli.config().client;
    let mut stdout = io::stdout();

    match cli.run_mode() {
        RunMode::Script(path) => {
            script::run_script(&path, &connector, options, &mut stdout).await?;
        }
        RunMode::Interactive(uri) => {
            let reason = shell::run_interactive(
                &connector,
                &uri,
                options,
                &cli.config().shell,
                TerminalSource::new(),
                &mut stdout,
            )
            .await?;
            debug!(?reason, "Shell finished");
        }
    }

    Ok(())
}

/// Initialize logging
///
/// `RUST_LOG` wins when set; otherwise the `--loglevel` value (default warn)
/// applies. Logs go to stderr so they never mix with shell output.
///
/// # Arguments
/// * `cli` - CLI interface carrying the logging configuration
fn initialize_logging(cli: &CliInterface) {
    let logging = &cli.config().logging;
    let level = logging.level.to_tracing_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);

    if logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
