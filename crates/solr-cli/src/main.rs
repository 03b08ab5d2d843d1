//! `solr-translate`: prints the Solr-native documents built from generic
//! queries, suggest requests, deletes and patches.

mod commands;
mod config;

use std::io;

use clap::Parser;
use tracing::debug;

use crate::config::Cli;

/// Initializes the logging subscriber. `RUST_LOG` overrides `level`.
///
/// Logs go to stderr so that stdout carries only the translated document.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("helios_solr={level},solr_translate={level}")));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = cli.adapter.load()?;
    debug!(core = %config.core_url(), id_field = %config.id_field, "Loaded adapter configuration");

    let native = commands::run(&cli.command, &config, io::stdin().lock())?;
    println!("{}", serde_json::to_string_pretty(&native)?);
    Ok(())
}
