//! Configuration for the packer.
//!
//! TOML-based, 4-layer resolution: CLI > env > config file > defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::CONFIG_FILE_NAME;
use crate::errors::ConfigError;
use crate::types::{MilliampHours, PackingParams};

/// Raw settings. Every field is optional so that layers can be merged.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PackerConfig {
    pub csv_file: Option<PathBuf>,
    pub series_count: Option<usize>,
    /// Largest spread allowed between cells in one parallel pack (mAh).
    pub max_cell_difference_mah: Option<MilliampHours>,
    /// Largest spread allowed between the effective capacities of series packs (mAh).
    pub max_pack_difference_mah: Option<MilliampHours>,
    pub capacity_target: Option<MilliampHours>,
    pub max_reported_packs: Option<usize>,
    pub max_retries: Option<usize>,
    pub verbose: Option<bool>,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_file: Option<PathBuf>,
    pub csv_file: Option<PathBuf>,
    pub series_count: Option<usize>,
    pub max_cell_difference_mah: Option<MilliampHours>,
    pub max_pack_difference_mah: Option<MilliampHours>,
    pub capacity_target: Option<MilliampHours>,
    pub max_reported_packs: Option<usize>,
    pub max_retries: Option<usize>,
    pub verbose: bool,
}

/// Fully validated settings ready to drive a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub csv_file: PathBuf,
    pub params: PackingParams,
    pub verbose: bool,
}

const ENV_CSV_FILE: &str = "PACKER_CSV_FILE";
const ENV_SERIES_COUNT: &str = "PACKER_SERIES_COUNT";
const ENV_MAX_CELL_DIFFERENCE: &str = "PACKER_MAX_CELL_DIFFERENCE_MAH";
const ENV_MAX_PACK_DIFFERENCE: &str = "PACKER_MAX_PACK_DIFFERENCE_MAH";
const ENV_CAPACITY_TARGET: &str = "PACKER_CAPACITY_TARGET";
const ENV_MAX_REPORTED_PACKS: &str = "PACKER_MAX_REPORTED_PACKS";
const ENV_MAX_RETRIES: &str = "PACKER_MAX_RETRIES";
const ENV_VERBOSE: &str = "PACKER_VERBOSE";

/// Every environment variable the loader reads.
pub const ENV_VARS: &[&str] = &[
    ENV_CSV_FILE,
    ENV_SERIES_COUNT,
    ENV_MAX_CELL_DIFFERENCE,
    ENV_MAX_PACK_DIFFERENCE,
    ENV_CAPACITY_TARGET,
    ENV_MAX_REPORTED_PACKS,
    ENV_MAX_RETRIES,
    ENV_VERBOSE,
];

impl PackerConfig {
    /// Load configuration with 4-layer resolution.
    ///
    /// Resolution order (highest priority first):
    /// 1. CLI flags
    /// 2. Environment variables (`PACKER_*`)
    /// 3. Config file: `cli.config_file` if given (must exist), else `cell-packer.toml` in `root`
    /// 4. Compiled defaults
    pub fn load(root: &Path, cli: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        match cli.and_then(|c| c.config_file.as_deref()) {
            Some(explicit) => Self::merge_toml_file(&mut config, explicit)?,
            None => {
                let project_config = root.join(CONFIG_FILE_NAME);
                if project_config.exists() {
                    Self::merge_toml_file(&mut config, &project_config)?;
                }
            }
        }

        Self::apply_env_overrides(&mut config);

        if let Some(cli) = cli {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }

    /// Check required fields and ranges, producing the settings for a run.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let csv_file = self
            .csv_file
            .clone()
            .ok_or(ConfigError::Missing { field: "csv_file" })?;
        let series_count = self.series_count.ok_or(ConfigError::Missing {
            field: "series_count",
        })?;
        let max_cell_difference = self.max_cell_difference_mah.ok_or(ConfigError::Missing {
            field: "max_cell_difference_mah",
        })?;
        let max_pack_difference = self.max_pack_difference_mah.ok_or(ConfigError::Missing {
            field: "max_pack_difference_mah",
        })?;

        if series_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "series_count",
                message: "must be greater than 0".to_string(),
            });
        }
        if max_cell_difference < 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_cell_difference_mah",
                message: "must not be negative".to_string(),
            });
        }
        if max_pack_difference < 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_pack_difference_mah",
                message: "must not be negative".to_string(),
            });
        }
        if let Some(reported) = self.max_reported_packs {
            if reported < series_count {
                return Err(ConfigError::InvalidValue {
                    field: "max_reported_packs",
                    message: format!("must be at least the series count ({series_count})"),
                });
            }
        }

        let params = PackingParams {
            series_count,
            max_pack_differential: max_cell_difference,
            max_difference_between_packs: max_pack_difference,
            capacity_target: self.capacity_target,
            max_reported_packs: self.max_reported_packs,
            max_retries: self.max_retries,
        };

        Ok(ResolvedConfig {
            csv_file,
            params,
            verbose: self.verbose.unwrap_or(false),
        })
    }

    /// Merge a TOML file into the existing config.
    fn merge_toml_file(config: &mut PackerConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::Io {
                path: path.display().to_string(),
                source: e,
            },
        })?;

        let file_config: PackerConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; only `Some` values in `other` override.
    fn merge(base: &mut PackerConfig, other: &PackerConfig) {
        if other.csv_file.is_some() {
            base.csv_file = other.csv_file.clone();
        }
        if other.series_count.is_some() {
            base.series_count = other.series_count;
        }
        if other.max_cell_difference_mah.is_some() {
            base.max_cell_difference_mah = other.max_cell_difference_mah;
        }
        if other.max_pack_difference_mah.is_some() {
            base.max_pack_difference_mah = other.max_pack_difference_mah;
        }
        if other.capacity_target.is_some() {
            base.capacity_target = other.capacity_target;
        }
        if other.max_reported_packs.is_some() {
            base.max_reported_packs = other.max_reported_packs;
        }
        if other.max_retries.is_some() {
            base.max_retries = other.max_retries;
        }
        if other.verbose.is_some() {
            base.verbose = other.verbose;
        }
    }

    /// Apply environment variable overrides. Unparsable values are ignored with a warning.
    fn apply_env_overrides(config: &mut PackerConfig) {
        if let Ok(val) = std::env::var(ENV_CSV_FILE) {
            config.csv_file = Some(PathBuf::from(val));
        }
        if let Some(v) = env_parse(ENV_SERIES_COUNT) {
            config.series_count = Some(v);
        }
        if let Some(v) = env_parse(ENV_MAX_CELL_DIFFERENCE) {
            config.max_cell_difference_mah = Some(v);
        }
        if let Some(v) = env_parse(ENV_MAX_PACK_DIFFERENCE) {
            config.max_pack_difference_mah = Some(v);
        }
        if let Some(v) = env_parse(ENV_CAPACITY_TARGET) {
            config.capacity_target = Some(v);
        }
        if let Some(v) = env_parse(ENV_MAX_REPORTED_PACKS) {
            config.max_reported_packs = Some(v);
        }
        if let Some(v) = env_parse(ENV_MAX_RETRIES) {
            config.max_retries = Some(v);
        }
        if let Some(v) = env_parse(ENV_VERBOSE) {
            config.verbose = Some(v);
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut PackerConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.csv_file {
            config.csv_file = Some(v.clone());
        }
        if let Some(v) = cli.series_count {
            config.series_count = Some(v);
        }
        if let Some(v) = cli.max_cell_difference_mah {
            config.max_cell_difference_mah = Some(v);
        }
        if let Some(v) = cli.max_pack_difference_mah {
            config.max_pack_difference_mah = Some(v);
        }
        if let Some(v) = cli.capacity_target {
            config.capacity_target = Some(v);
        }
        if let Some(v) = cli.max_reported_packs {
            config.max_reported_packs = Some(v);
        }
        if let Some(v) = cli.max_retries {
            config.max_retries = Some(v);
        }
        if cli.verbose {
            config.verbose = Some(true);
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}
