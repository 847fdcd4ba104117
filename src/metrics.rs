//! Capacity metrics for packs and configurations.
//!
//! All functions are pure and take already-assembled packs.

use crate::constants::{AMP_HOUR_DECIMALS, NOMINAL_CELL_VOLTAGE};
use crate::types::{Configuration, MilliampHours};

/// `len * min` of a cell list. `None` for an empty list.
pub fn effective_capacity(cells: &[MilliampHours]) -> Option<MilliampHours> {
    let weakest = cells.iter().copied().min()?;
    Some(cells.len() as MilliampHours * weakest)
}

/// Amp-hour rating of the series string: the weakest active pack, in Ah, to two decimals.
///
/// `None` when the configuration has no active packs.
pub fn derive_amp_hours(configuration: &Configuration, series_count: usize) -> Option<f64> {
    let weakest = configuration
        .active(series_count)
        .iter()
        .map(|pack| pack.effective_capacity())
        .min()?;
    Some(round_to(weakest as f64 / 1000.0, AMP_HOUR_DECIMALS))
}

/// Nominal energy in whole watt-hours.
pub fn derive_watt_hours(series_count: usize, amp_hours: f64) -> i64 {
    (NOMINAL_CELL_VOLTAGE * series_count as f64 * amp_hours).round() as i64
}

/// `delta / reference` as a percentage rounded to `decimals` places. Zero when `reference` is 0.
pub fn percentage(delta: MilliampHours, reference: MilliampHours, decimals: i32) -> f64 {
    if reference == 0 {
        return 0.0;
    }
    round_to(delta as f64 / reference as f64 * 100.0, decimals)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
