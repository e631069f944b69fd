use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::cli::CliArgs;
use crate::output::{OUTPUT_VARIABLE_NAME, OutputProtocol};
use crate::scan::DEFAULT_CHARMS_SUBDIR;

/// Config file format understood by this build
pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(default)]
pub struct Config {
    pub version: u32,
    pub charms_subdir: String,
    pub output_name: String,
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub protocol: OutputProtocol,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            charms_subdir: DEFAULT_CHARMS_SUBDIR.to_string(),
            output_name: OUTPUT_VARIABLE_NAME.to_string(),
            output: OutputConfig::default(),
        }
    }
}

pub fn get_default_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "get-charm-paths")
        .context("Failed to determine project directories")?;

    let config_dir = proj_dirs.config_dir();
    Ok(config_dir.join("get-charm-paths.toml"))
}

impl Config {
    /// Load configuration from `config_path`, or from the default location.
    ///
    /// A missing file at the default location yields the defaults; a missing
    /// file that was asked for explicitly is an error. Nothing is written.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p,
            None => {
                // No home directory in some CI containers
                let Ok(default_path) = get_default_config_path() else {
                    debug!("No default config location, using defaults");
                    return Ok(Config::default());
                };
                if !default_path.exists() {
                    debug!("No config at {}, using defaults", default_path.display());
                    return Ok(Config::default());
                }
                default_path
            }
        };

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_cli_and_file(cli_args: &CliArgs) -> Result<Self> {
        let mut config = Self::load(cli_args.config.clone())?;

        // CLI args override config file
        if let Some(charms_subdir) = &cli_args.charms_subdir {
            config.charms_subdir = charms_subdir.clone();
        }

        config.validate()?;
        Ok(config)
    }

    /// The file version must be supported and `charms_subdir` must be a
    /// single relative path segment.
    pub fn validate(&self) -> Result<()> {
        if self.version != CONFIG_VERSION {
            bail!(
                "Unsupported config version {} (expected {})",
                self.version,
                CONFIG_VERSION
            );
        }

        let mut components = Path::new(&self.charms_subdir).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => bail!(
                "charms_subdir must be a single directory name, got {:?}",
                self.charms_subdir
            ),
        }

        if self.output_name.trim().is_empty() {
            bail!("output_name must not be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(path: &Path, config: &Config) -> Result<()> {
        fs::write(path, toml::to_string_pretty(config)?)?;
        Ok(())
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.version, 1);
        assert_eq!(config.charms_subdir, "charms");
        assert_eq!(config.output_name, "charm_paths");
        assert_eq!(config.output.protocol, OutputProtocol::Auto);
    }

    #[test]
    fn test_config_partial_file_uses_defaults() -> Result<()> {
        let config: Config = toml::from_str("charms_subdir = \"operators\"\n")?;
        assert_eq!(config.charms_subdir, "operators");
        assert_eq!(config.output_name, "charm_paths");
        assert_eq!(config.output.protocol, OutputProtocol::Auto);
        Ok(())
    }

    #[test]
    fn test_config_protocol_names() -> Result<()> {
        let config: Config = toml::from_str("[output]\nprotocol = \"set-output\"\n")?;
        assert_eq!(config.output.protocol, OutputProtocol::SetOutput);

        let config: Config = toml::from_str("[output]\nprotocol = \"env-file\"\n")?;
        assert_eq!(config.output.protocol, OutputProtocol::EnvFile);

        assert!(toml::from_str::<Config>("[output]\nprotocol = \"carrier-pigeon\"\n").is_err());
        Ok(())
    }

    #[test]
    fn test_config_file_roundtrip() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("test.toml");

        let mut config = Config::default();
        config.charms_subdir = "operators".to_string();
        config.output.protocol = OutputProtocol::EnvFile;

        write_config(&config_path, &config)?;
        let loaded_config = Config::load(Some(config_path))?;

        assert_eq!(config, loaded_config);
        Ok(())
    }

    #[test]
    fn test_config_load_explicit_missing_file_fails() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nonexistent.toml");

        assert!(Config::load(Some(config_path.clone())).is_err());
        // Loading must not create the file
        assert!(!config_path.exists());
        Ok(())
    }

    #[test]
    fn test_config_load_rejects_invalid_subdir() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("bad.toml");
        fs::write(&config_path, "charms_subdir = \"nested/charms\"\n")?;

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(format!("{:#}", err).contains("single directory name"));
        Ok(())
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        for bad in ["", "/abs", "a/b", "..", "."] {
            config.charms_subdir = bad.to_string();
            assert!(config.validate().is_err(), "{:?} should be rejected", bad);
        }

        config.charms_subdir = "charms".to_string();
        config.output_name = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_load_rejects_unknown_version() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("future.toml");
        fs::write(&config_path, "version = 2\n")?;

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(format!("{:#}", err).contains("Unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn test_cli_override() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("test.toml");

        let original_config = Config {
            charms_subdir: "from-file".to_string(),
            ..Config::default()
        };
        write_config(&config_path, &original_config)?;

        let cli_args = CliArgs {
            base_dir: PathBuf::from("."),
            charms_subdir: Some("from-cli".to_string()),
            config: Some(config_path),
        };

        let final_config = Config::from_cli_and_file(&cli_args)?;
        assert_eq!(final_config.charms_subdir, "from-cli");
        Ok(())
    }

    #[test]
    fn test_get_default_config_path() -> Result<()> {
        let path = get_default_config_path()?;
        assert!(path.ends_with("get-charm-paths.toml"));
        Ok(())
    }
}
