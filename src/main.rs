//! `homestead` binary entry point.
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use homestead::{cli, commands, logging};

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose, "bootstrap");
    let log = Arc::new(logging::Logger::new("bootstrap"));

    commands::bootstrap::run(&args.global, &args.tasks, &log)
}
