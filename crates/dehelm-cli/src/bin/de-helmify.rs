//! de-helmify - split a kubecost Helm manifest into static per-object files

use clap::Parser;
use dehelm::{CommonArgs, commands, exit_with, logging, parse_args};
use dehelm_convert::{Environment, Profile};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "de-helmify")]
#[command(version)]
#[command(about = "Turn a Helm-rendered kubecost manifest into numbered per-object files", long_about = None)]
struct Cli {
    /// Path to the rendered k8s manifest
    manifest: PathBuf,

    /// Deployment to generate files for
    #[arg(value_name = "primary|secondary|waterfowl")]
    environment: Environment,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() {
    miette::set_panic_hook();

    let cli: Cli = parse_args();
    logging::setup_logging(cli.common.verbose);

    let profile = Profile::kubecost(cli.environment);
    if let Err(err) = commands::convert::run(
        profile,
        &cli.manifest,
        &cli.common.output_root,
        &cli.common.run_options(),
    ) {
        exit_with(err);
    }
}
