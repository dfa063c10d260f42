//! Dehelm CLI - shared pieces of the `de-helmify` binaries
//!
//! `de-helmify` runs the strict kubecost profile, `de-helmify-flink` the
//! lenient flink-operator profile. Both parse their arguments with clap,
//! log through `tracing` and report failures as miette diagnostics.

use clap::{Args, Parser};
use std::path::PathBuf;

pub mod commands;
pub mod error;
pub mod exit_codes;
pub mod logging;

use crate::commands::convert::RunOptions;
use crate::error::CliError;

/// Flags accepted by every binary
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Directory the ops/k8s tree is created in
    #[arg(long, default_value = ".")]
    pub output_root: PathBuf,

    /// Show what would be written without touching the filesystem
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not print the run summary
    #[arg(short, long)]
    pub quiet: bool,
}

impl CommonArgs {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            dry_run: self.dry_run,
            quiet: self.quiet,
        }
    }
}

/// Parse arguments, printing usage and exiting with `USAGE_ERROR` on failure
pub fn parse_args<T: Parser>() -> T {
    match T::try_parse() {
        Ok(args) => args,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            std::process::exit(exit_codes::USAGE_ERROR);
        }
    }
}

/// Report a failed run and exit with its code
pub fn exit_with(err: CliError) -> ! {
    let code = err.exit_code();
    eprintln!("{:?}", miette::Report::new(err));
    std::process::exit(code);
}
