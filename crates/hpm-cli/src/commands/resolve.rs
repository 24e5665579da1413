//! Resolve command

use std::path::Path;

use colored::Colorize;
use hpm_core::{AggregateReport, PackageAggregator, SeedMapping};
use hpm_host::load_snapshot_file;

use crate::cli::Order;
use crate::error::{CliError, Result};
use crate::render;

/// Resolve a single package directory against a seed read from disk.
pub fn run_resolve(
    dir: &Path,
    seed_file: Option<&Path>,
    vars: &[String],
    order: Order,
    include_disabled: bool,
    json: bool,
) -> Result<()> {
    if !dir.is_dir() {
        return Err(CliError::user(format!(
            "Package directory not found: {}",
            dir.display()
        )));
    }

    let seed = build_seed(seed_file, vars)?;
    let aggregator = PackageAggregator::default()
        .with_ordering(order.into())
        .include_disabled(include_disabled);
    let report = aggregator.aggregate_dir(dir, &seed)?;

    if json {
        return render::print_json(&report);
    }
    print_report(dir, &report);
    Ok(())
}

fn build_seed(seed_file: Option<&Path>, vars: &[String]) -> Result<SeedMapping> {
    let mut seed = match seed_file {
        Some(path) => load_snapshot_file(path)?,
        None => SeedMapping::new(),
    };
    for var in vars {
        let (name, value) = parse_var(var)?;
        seed.insert(name.to_string(), value.to_string());
    }
    Ok(seed)
}

fn parse_var(var: &str) -> Result<(&str, &str)> {
    match var.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => Err(CliError::user(format!(
            "Invalid variable '{var}', expected NAME=VALUE"
        ))),
    }
}

fn print_report(dir: &Path, report: &AggregateReport) {
    println!("{} {}", "Packages in".bold(), dir.display().to_string().cyan());
    render::print_packages(&report.packages);
    render::heading("Environment");
    render::print_environment(&report.environment);
    if !report.misplaced.is_empty() {
        render::heading("Ignored (outside env)");
        render::print_environment(&report.misplaced);
    }

    let diagnostics: Vec<_> = report.diagnostics().collect();
    if !diagnostics.is_empty() {
        render::heading("Diagnostics");
        render::print_diagnostics(diagnostics);
    }
}
