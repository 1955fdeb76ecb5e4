//! keyspace-inventory - Redis Keyspace Inventory
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use keyspace_inventory::config::{CliArgs, ScanConfig};
use keyspace_inventory::progress::{print_header, print_summary};
use keyspace_inventory::store::RedisConnector;
use keyspace_inventory::{Inventory, ReportOnExit};
use std::io;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = ScanConfig::from_args(args).context("Invalid configuration")?;

    if config.show_progress {
        print_header(
            &config.target.to_display_string(),
            config.pattern.as_deref(),
            config.sampling_cap,
        );
    }

    // From here on the report is printed on every exit path
    let mut report = ReportOnExit::new(io::stdout(), config.top);

    let connector = RedisConnector::new(config.target.clone());
    let mut inventory =
        Inventory::connect(config.clone(), connector).context("Failed to reach store")?;

    let summary = inventory
        .run(report.table_mut())
        .context("Keyspace scan failed")?;

    if config.show_progress {
        print_summary(
            summary.keys_processed,
            report.table().len(),
            summary.batches,
            summary.reconnects,
            summary.duration,
            summary.completed,
        );
    }

    if summary.stopped_early {
        info!(limit = ?config.key_limit, "Scan stopped at key limit");
    }

    report.finish().context("Failed to write report")?;

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let default = if verbose {
        "keyspace_inventory=debug,warn"
    } else {
        "keyspace_inventory=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize logging")?;

    Ok(())
}
