//! # layerbox
//!
//! Runs a single command inside fresh mount and PID namespaces, on top
//! of an overlay of a base image.
//!
//! ```text
//! layerbox [OPTIONS] <ID> <IMAGE> <COMMAND>...
//! ```

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    // stdout belongs to the container command
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    cli::execute(cli)
}
