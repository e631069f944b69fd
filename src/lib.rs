//! get-charm-paths library
//!
//! Finds charm directories in a repository checkout and publishes them as a
//! CI step output. Exposed as a library for testing.

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scan;

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::config::Config;
use crate::output::{CharmPaths, OutputTarget, emit};
use crate::scan::{find_charms_in_dir, stringify_paths};

/// Discover, normalize and emit the charm paths under `base_dir`.
///
/// Returns the emitted paths.
pub fn run<W: Write>(
    base_dir: &Path,
    config: &Config,
    target: &OutputTarget,
    out: &mut W,
) -> Result<CharmPaths> {
    let charm_dirs = find_charms_in_dir(base_dir, &config.charms_subdir)
        .with_context(|| format!("Failed to search for charms in {}", base_dir.display()))?;

    let charm_paths = CharmPaths::from(stringify_paths(&charm_dirs));

    emit(out, target, &config.output_name, &charm_paths)
        .with_context(|| format!("Failed to emit output {}", config.output_name))?;

    Ok(charm_paths)
}
