//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::constants::{DEFAULT_LOG_FILTER, LOG_ENV_VAR, VERBOSE_LOG_FILTER};

static INIT: Once = Once::new();

/// Initialize logging to stderr so reports on stdout stay clean.
///
/// Reads `PACKER_LOG` for the filter, e.g. `PACKER_LOG=cell_packer::assembly=trace`.
/// Falls back to `cell_packer=info`, or `cell_packer=debug` when `verbose` is set.
///
/// Idempotent.
pub fn init_tracing(verbose: bool) {
    INIT.call_once(|| {
        let fallback = if verbose {
            VERBOSE_LOG_FILTER
        } else {
            DEFAULT_LOG_FILTER
        };
        let filter =
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(fallback));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .with(filter)
            .init();
    });
}
