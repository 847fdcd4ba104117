//! Error types. One enum per subsystem, `thiserror` only.

use crate::types::MilliampHours;

/// Errors from reading a capacity list.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to read capacities from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}: `{content}` is not an integer capacity")]
    InvalidLine { line: usize, content: String },

    #[error("Line {line}: capacity must be positive, got {value}")]
    NonPositive { line: usize, value: MilliampHours },

    #[error("No capacities found in {path}")]
    Empty { path: String },
}

/// Errors from loading and resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Missing required setting: {field}")]
    Missing { field: &'static str },

    #[error("Invalid config value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}

/// Why an assembly run gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfeasibleReason {
    /// The target fell below the smallest cell, so no pack can be formed.
    TargetBelowSmallestCell,
    /// The configured retry budget ran out.
    RetriesExhausted,
    /// There were no cells to pack.
    NoCells,
}

impl std::fmt::Display for InfeasibleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfeasibleReason::TargetBelowSmallestCell => {
                write!(f, "capacity target fell below the smallest cell")
            }
            InfeasibleReason::RetriesExhausted => write!(f, "retry limit reached"),
            InfeasibleReason::NoCells => write!(f, "no cells to pack"),
        }
    }
}

/// Errors from the assembly loop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    #[error(
        "No valid battery found after {attempts} attempt(s); last target {last_target} mAh ({reason})"
    )]
    Infeasible {
        attempts: usize,
        last_target: MilliampHours,
        reason: InfeasibleReason,
    },
}

/// Top-level error for the binary.
#[derive(Debug, thiserror::Error)]
pub enum PackerError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

impl PackerError {
    /// Process exit code: 1 for an infeasible battery, 2 for caller-side problems.
    pub fn exit_code(&self) -> i32 {
        match self {
            PackerError::Assembly(_) => 1,
            PackerError::Source(_) | PackerError::Config(_) => 2,
        }
    }
}

pub type PackerResult<T> = Result<T, PackerError>;
