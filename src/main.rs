mod cli;
mod driver;
mod transcode;
mod watch;

use clap::Parser;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

#[macro_use]
extern crate tracing;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let config = cli.config();

    driver::run(&config)?;

    if cli.watch {
        watch::watch(&config)?;
    }

    Ok(())
}
