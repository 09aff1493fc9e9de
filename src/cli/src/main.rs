//! sptgen CLI entry point.

use std::process;
use std::str::FromStr;

use clap::Parser;
use log::{error, LevelFilter};

use sptgen_cli::Args;

fn main() {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'info' instead.",
            args.log_level
        );
        LevelFilter::Info
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    if let Err(err) = sptgen_cli::run(&args) {
        error!("{err:#}");
        process::exit(1);
    }
}
