//! Groups measured battery cells into parallel packs for a series battery, keeping the spread
//! inside each pack and between packs within tolerance.

pub mod assembly;
pub mod config;
pub mod constants;
pub mod errors;
pub mod finder;
pub mod invariants;
pub mod metrics;
pub mod report;
pub mod simulator;
pub mod source;
pub mod telemetry;
pub mod types;
pub mod validator;

pub use assembly::{assemble, Assembly};
pub use errors::{AssemblyError, PackerError, PackerResult};
pub use finder::find_pack;
pub use types::{Configuration, MilliampHours, Pack, PackWindow, PackingParams, SortedCapacities};
pub use validator::{check_configuration, validate};
