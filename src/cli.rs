use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, PartialEq)]
#[command(name = "get-charm-paths", version)]
#[command(
    about = "Find charm directories",
    long_about = "Find charm directories. Searches for either nested charms or whether the \
                  directory is itself a charm, printing a GitHub Actions compatible output of a \
                  JSON list of the found charm directories. If no charm directories are found, \
                  this emits an empty list and does not fail.\n\n\
                  BASE_DIR is the only required input. --charms-subdir and --config are \
                  optional overrides of the built-in defaults."
)]
pub struct CliArgs {
    /// Directory to search for charms
    pub base_dir: PathBuf,

    /// Subdirectory of BASE_DIR holding nested charms (overrides config)
    #[arg(long)]
    pub charms_subdir: Option<String>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}
