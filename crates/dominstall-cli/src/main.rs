mod cli;
mod dispatch;
mod render;
mod signatures;

use std::ffi::OsString;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{normalize_legacy_args, Cli, LOG_FILTER_ENV};
use crate::dispatch::{run_cli, wait_before_exit};
use crate::render::current_output_style;

fn main() -> Result<()> {
    let raw_args = std::env::args_os().collect::<Vec<OsString>>();
    let cli = Cli::parse_from(normalize_legacy_args(raw_args.iter().cloned()));
    init_tracing(cli.verbose);

    let command_line = raw_args
        .iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let result = run_cli(&cli, command_line);

    wait_before_exit(cli.wait, current_output_style());
    result
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
