//! Scan command

use std::path::Path;

use colored::Colorize;
use hpm_scan::{ConfigLoader, InstallationReport, ScanReport, Scanner};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::render;

/// Scan every installation the configuration names or discovers.
pub fn run_scan(config: Option<&Path>, json: bool) -> Result<()> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = config {
        loader = loader.with_file(path);
    }
    let config = loader.load()?;
    let installations = config.installations();
    tracing::debug!(count = installations.len(), "Installations to scan");

    let cancel = CancellationToken::new();
    let scanner = Scanner::from_config(&config).with_cancellation(cancel.clone());

    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(async move {
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
        let report = scanner.scan(installations).await;
        interrupt.abort();
        report
    });

    if json {
        return render::print_json(&report);
    }
    print_report(&report);
    Ok(())
}

fn print_report(report: &ScanReport) {
    if report.installations.is_empty() {
        println!("{}", "No Houdini installations found.".yellow());
        return;
    }
    for (i, installation) in report.installations.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_installation(installation);
    }

    let degraded = report.degraded().count();
    if degraded > 0 {
        println!();
        println!(
            "{} {} of {} installation(s) resolved without a full environment",
            "!".yellow().bold(),
            degraded,
            report.installations.len()
        );
    }
}

fn print_installation(report: &InstallationReport) {
    render::print_installation(&report.installation);
    println!("  seed: {}", render::seed_status_label(report.seed_status));
    match &report.packages_dir {
        Some(dir) => println!("  packages: {}", dir.display()),
        None => println!("  packages: {}", "unknown".yellow()),
    }

    render::heading("Packages");
    render::print_packages(&report.packages);
    render::heading("Environment");
    render::print_environment(&report.environment);
    if !report.misplaced.is_empty() {
        render::heading("Ignored (outside env)");
        render::print_environment(&report.misplaced);
    }

    let diagnostics: Vec<_> = report.all_diagnostics().collect();
    if !diagnostics.is_empty() {
        render::heading("Diagnostics");
        render::print_diagnostics(diagnostics);
    }
}
