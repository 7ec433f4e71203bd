//! DocPulse Binary
//!
//! Reports go to stdout; logs go to stderr so reports can be piped.

use clap::Parser;
use docpulse_cli::{commands, Cli};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    tracing::debug!("Starting docpulse v{}", env!("CARGO_PKG_VERSION"));

    let mut stdout = io::stdout().lock();
    commands::run(cli, &mut stdout)
}
