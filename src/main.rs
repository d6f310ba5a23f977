//! Serial-Binder main entry point
//!
//! This is the command-line interface for binding a web serial into an EPUB.

use clap::Parser;
use serial_binder::config::{load_config_with_hash, validate, Config};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Serial-Binder: binds a paginated web serial into an ebook
///
/// Serial-Binder follows the chain of "next chapter" links from the first
/// chapter, groups chapters into story arcs and writes a single EPUB with
/// images embedded.
#[derive(Parser, Debug)]
#[command(name = "serial-binder")]
#[command(version)]
#[command(about = "Binds a paginated web serial into an EPUB", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Where to write the book, overriding the configured path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            Config::default()
        }
    };

    if let Some(output) = cli.output {
        config.book.output_path = output;
        validate(&config)?;
    }

    tracing::info!(
        "Binding '{}' by {} starting at {}",
        config.book.title,
        config.book.author,
        config.source.start_url
    );

    match serial_binder::run(config).await {
        Ok(path) => {
            println!("{}", path.display());
            Ok(())
        }
        Err(e) => {
            tracing::error!("Binding failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("serial_binder=info,warn"),
            1 => EnvFilter::new("serial_binder=debug,info"),
            2 => EnvFilter::new("serial_binder=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
