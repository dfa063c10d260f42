//! Convert command - split a rendered manifest into per-object files

use console::style;
use dehelm_convert::{ConvertOptions, Converter, Profile, RunReport, SkipReason};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;

/// Options shared by both binaries
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    pub quiet: bool,
}

pub fn run(
    profile: Profile,
    manifest: &Path,
    output_base: &Path,
    options: &RunOptions,
) -> Result<RunReport> {
    let output_root = output_base.join(&profile.output_root);

    if !options.quiet {
        print_header(&profile, manifest, &output_root);
    }

    let converter = Converter::new(
        profile,
        ConvertOptions {
            dry_run: options.dry_run,
        },
    );
    let report = converter.convert_file(manifest, output_base)?;

    if !options.quiet {
        print_files(&report, &output_root);
        print_skipped(&report);
        print_summary(&report, options.dry_run);
    }

    Ok(report)
}

fn print_header(profile: &Profile, manifest: &Path, output_root: &Path) {
    println!();
    println!(
        "  {} {} {}",
        style("De-Helmify").bold().cyan(),
        style("─").dim(),
        style(profile.name).dim()
    );
    println!();
    println!(
        "  {} {}",
        style("Source:").dim(),
        style(manifest.display()).cyan()
    );
    println!(
        "  {} {}",
        style("Target:").dim(),
        style(output_root.display()).green()
    );
    println!();
}

fn print_files(report: &RunReport, output_root: &Path) {
    if report.written.is_empty() {
        return;
    }

    let mut by_destination: BTreeMap<&str, Vec<&Path>> = BTreeMap::new();
    for written in &report.written {
        by_destination
            .entry(written.destination.as_str())
            .or_default()
            .push(&written.path);
    }

    for (destination, files) in by_destination {
        let title = if destination.is_empty() { "." } else { destination };
        println!("  {}", style(title).bold());
        for file in files {
            let rel_path = file.strip_prefix(output_root).unwrap_or(file);
            println!("  {} {}", style("✓").green().bold(), rel_path.display());
        }
        println!();
    }
}

fn print_skipped(report: &RunReport) {
    if report.skipped.is_empty() {
        return;
    }

    println!("  {}", style("Skipped Documents").bold().yellow());
    println!("  {}", style("─────────────────").dim());

    for skipped in &report.skipped {
        let what = skipped
            .name
            .clone()
            .unwrap_or_else(|| format!("document {}", skipped.index));
        let why = match &skipped.reason {
            SkipReason::GrafanaDashboard => "Grafana dashboard ConfigMap".to_string(),
            SkipReason::Malformed(message) => message.clone(),
        };
        println!("  {} {} {}", style("○").yellow(), what, style(why).dim());
    }

    println!();
}

fn print_summary(report: &RunReport, dry_run: bool) {
    let written = report.written.len();
    let stats = &report.stats;

    println!("  {}", style("Summary").bold());
    println!("  {}", style("───────").dim());

    println!(
        "  {} {} {}",
        style(format!("{:>3}", written)).green().bold(),
        style(if written == 1 { "object" } else { "objects" }).dim(),
        if dry_run { "would be written" } else { "written" }
    );

    if !report.skipped.is_empty() {
        println!(
            "  {} {} skipped",
            style(format!("{:>3}", report.skipped.len())).yellow().bold(),
            style("documents").dim()
        );
    }

    for (count, label) in [
        (stats.remapped_images, "images remapped"),
        (stats.pruned_keys, "Helm keys pruned"),
        (stats.pruned_entries, "HELM_VALUES entries pruned"),
        (stats.pruned_rbac_resources, "RBAC resources pruned"),
    ] {
        if count > 0 {
            println!(
                "  {} {}",
                style(format!("{:>3}", count)).blue().bold(),
                style(label).dim()
            );
        }
    }

    println!();

    if dry_run {
        println!(
            "  {} {}",
            style("ℹ").cyan(),
            style("Dry run mode - no files were written").dim()
        );
        println!();
    }
}
