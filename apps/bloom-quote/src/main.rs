//! # bloom-quote
//!
//! Command-line front end for the Bloom pricing engine.
//!
//! ## User Workflow
//! ```text
//! $ bloom-quote config init             # write store.toml with defaults
//! $ bloom-quote shipping                # what checkout will offer
//! $ bloom-quote promo save10            # is the code live?
//! $ bloom-quote quote --cart cart.json --code SAVE10
//! ```
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `info`).

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();
    commands::run(cli)
}
