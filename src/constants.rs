// Constants for the packing model.

use crate::types::MilliampHours;

// Amount the finder target drops after each rejected configuration
pub const TARGET_STEP: MilliampHours = 100;

// Nominal Li-ion cell voltage used for watt-hour ratings
pub const NOMINAL_CELL_VOLTAGE: f64 = 3.6;

// Rounding applied to reported figures
pub const AMP_HOUR_DECIMALS: i32 = 2;
pub const PERCENT_DECIMALS: i32 = 3;

// Project config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "cell-packer.toml";

// Log filter environment variable and its fallbacks
pub const LOG_ENV_VAR: &str = "PACKER_LOG";
pub const DEFAULT_LOG_FILTER: &str = "cell_packer=info";
pub const VERBOSE_LOG_FILTER: &str = "cell_packer=debug";
