//! Installs command

use std::path::PathBuf;

use colored::Colorize;
use hpm_host::{default_install_roots, discover_installations};

use crate::error::Result;
use crate::render;

/// List installations under `roots`, or under the platform default.
pub fn run_installs(roots: &[PathBuf], json: bool) -> Result<()> {
    let roots = if roots.is_empty() {
        default_install_roots()
    } else {
        roots.to_vec()
    };
    let installations = discover_installations(&roots);

    if json {
        return render::print_json(&installations);
    }
    if installations.is_empty() {
        println!("{}", "No Houdini installations found.".yellow());
        return Ok(());
    }
    for installation in &installations {
        render::print_installation(installation);
    }
    Ok(())
}
