//! Human-readable and JSON output

use colored::Colorize;
use hpm_core::{Diagnostic, EnvMap, PackageResolution, SeedMapping, Severity};
use hpm_host::Installation;
use hpm_scan::SeedStatus;
use serde::Serialize;

use crate::error::Result;

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_installation(installation: &Installation) {
    let version = installation
        .version
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unknown version".to_string());
    println!(
        "{}  {}  {}",
        installation.name.cyan().bold(),
        version.green(),
        installation.hfs.display().to_string().dimmed()
    );
}

pub fn seed_status_label(status: SeedStatus) -> colored::ColoredString {
    match status {
        SeedStatus::Captured => "captured".green(),
        SeedStatus::TimedOut => "timed out".yellow(),
        SeedStatus::Failed => "failed".red(),
    }
}

pub fn print_packages(packages: &[PackageResolution]) {
    if packages.is_empty() {
        println!("  {}", "(no packages)".dimmed());
        return;
    }
    for package in packages {
        let marker = if package.is_malformed() {
            "✗".red()
        } else if package.enabled {
            "✓".green()
        } else {
            "-".dimmed()
        };
        let state = if package.enabled { "" } else { " (disabled)" };
        println!("  {} {}{}", marker, package.name.bold(), state.dimmed());
        for path in &package.plugin_paths {
            println!("      {}", path.dimmed());
        }
    }
}

pub fn print_environment(environment: &EnvMap) {
    if environment.is_empty() {
        println!("  {}", "(empty)".dimmed());
        return;
    }
    for (name, values) in environment.iter() {
        println!("  {}", name.cyan());
        for value in values {
            println!("      {value}");
        }
    }
}

pub fn print_seed(seed: &SeedMapping) {
    for (name, value) in seed {
        println!("{} = {}", name.cyan(), value);
    }
}

pub fn print_diagnostics<'a>(diagnostics: impl IntoIterator<Item = &'a Diagnostic>) {
    for diagnostic in diagnostics {
        println!("  {}", colorize(diagnostic));
    }
}

fn colorize(diagnostic: &Diagnostic) -> colored::ColoredString {
    let line = diagnostic.to_string();
    match diagnostic.severity {
        Severity::Error => line.red(),
        Severity::Warning => line.yellow(),
        Severity::Info => line.dimmed(),
    }
}

/// Print a section title.
pub fn heading(title: &str) {
    println!("{}", title.bold());
}
