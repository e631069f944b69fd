use anyhow::Result;
use clap::Parser;
use std::io;
use tracing::info;
use tracing_subscriber::EnvFilter;

use get_charm_paths::cli::CliArgs;
use get_charm_paths::config::Config;

fn main() -> Result<()> {
    // Logs go to stderr, stdout carries the step output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = Config::from_cli_and_file(&args)?;
    let target = config.output.protocol.resolve()?;

    info!("Searching for charms in {}", args.base_dir.display());

    let stdout = io::stdout();
    let charm_paths = get_charm_paths::run(&args.base_dir, &config, &target, &mut stdout.lock())?;

    info!("Emitted {} charm path(s)", charm_paths.len());
    Ok(())
}
