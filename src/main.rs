use clap::Parser;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;
use trendscan::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(Targets::new().with_default(level));
    tracing_subscriber::registry().with(fmt_layer).init();

    run(cli)
}
