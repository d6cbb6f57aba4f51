//! estab - export Elasticsearch documents as delimited text
//!
//! Streams every hit of a query through the scroll API and writes one row
//! per document to stdout or a file.
//!
//! # Usage
//!
//! ```bash
//! estab --indices people -f "name address.city tags" --header > people.tsv
//! ```

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use estab::cli::CliInterface;
use estab::error::Result;
use estab::export::run_export;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands or run the export
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    let cancel_token = CancellationToken::new();
    let ctrl_c_handle = spawn_ctrl_c_listener(cancel_token.clone());

    let result = run_export(cli.config(), cancel_token).await;
    ctrl_c_handle.abort();
    let result = result?;

    if result.cancelled {
        warn!(
            "Export interrupted after {} documents",
            result.documents_received
        );
    } else {
        info!(
            "Exported {} rows ({} skipped) in {} ms",
            result.rows_written, result.rows_skipped, result.elapsed_ms
        );
    }

    Ok(())
}

/// Cancel `token` on the first Ctrl+C
fn spawn_ctrl_c_listener(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupt received, stopping export");
                token.cancel();
            }
            Err(err) => {
                eprintln!("Failed to listen for Ctrl+C: {}", err);
            }
        }
    })
}

/// Initialize logging on stderr
///
/// `RUST_LOG` takes precedence over the configured level.
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::default().add_directive(LevelFilter::from_level(level).into())
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
