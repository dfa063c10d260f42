//! de-helmify-flink - split the flink operator manifest into per-object files

use clap::Parser;
use dehelm::{CommonArgs, commands, exit_with, logging, parse_args};
use dehelm_convert::Profile;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "de-helmify-flink")]
#[command(version)]
#[command(about = "Turn the rendered flink operator manifest into numbered per-object files", long_about = None)]
struct Cli {
    /// Path to the rendered k8s manifest
    manifest: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() {
    miette::set_panic_hook();

    let cli: Cli = parse_args();
    logging::setup_logging(cli.common.verbose);

    if let Err(err) = commands::convert::run(
        Profile::flink_operator(),
        &cli.manifest,
        &cli.common.output_root,
        &cli.common.run_options(),
    ) {
        exit_with(err);
    }
}
