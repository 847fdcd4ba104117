//! Pack assembly loop.
//!
//! Carves the sorted capacities into packs with the finder, validates the result, and on
//! rejection lowers the target by [`TARGET_STEP`] and starts over from scratch. The loop ends
//! with an accepted [`Assembly`] or with [`AssemblyError::Infeasible`] once the target drops
//! below the smallest cell or the retry budget runs out.

use tracing::{debug, info, trace, warn};

use crate::constants::{PERCENT_DECIMALS, TARGET_STEP};
use crate::errors::{AssemblyError, InfeasibleReason};
use crate::finder::find_pack;
use crate::metrics::{derive_amp_hours, derive_watt_hours, percentage};
use crate::types::{Configuration, MilliampHours, Pack, PackingParams, SortedCapacities};
use crate::validator::{check_configuration, ValidationReport};

/// Phase of the assembly state machine. Each phase owns what the next one needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Scanning,
    Validating(Attempt),
    Retrying,
    Accepted(Attempt, ValidationReport),
}

/// One scanning pass: the packs carved at a given target and the cells left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub target: MilliampHours,
    pub configuration: Configuration,
    /// Cells skipped between packs because no window could include them.
    pub skipped: Vec<MilliampHours>,
    /// Cells after the last pack.
    pub leftover: Vec<MilliampHours>,
}

/// An accepted battery.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub series_count: usize,
    pub max_pack_differential: MilliampHours,
    pub max_difference_between_packs: MilliampHours,
    /// Packs retained for the report, in assembly order. The first `series_count` are active.
    pub configuration: Configuration,
    pub discarded: Vec<MilliampHours>,
    pub input_cells: usize,
    pub total_cells: usize,
    /// Effective capacities of the retained packs, largest first.
    pub pack_capacities: Vec<MilliampHours>,
    pub capacity_delta: MilliampHours,
    pub delta_percentage: f64,
    pub amp_hours: f64,
    pub watt_hours: i64,
    pub initial_target: MilliampHours,
    pub final_target: MilliampHours,
    pub retries: usize,
    pub validation: ValidationReport,
}

impl Assembly {
    pub fn active_packs(&self) -> &[Pack] {
        self.configuration.active(self.series_count)
    }
}

/// Default starting target: the largest pack the finder can build with no target at all.
pub fn initial_target(
    capacities: &SortedCapacities,
    max_pack_differential: MilliampHours,
) -> MilliampHours {
    find_pack(capacities, 0, capacities.len(), max_pack_differential, None).capacity
}

/// Run the finder over `capacities` at `target` until it runs out of packs.
pub fn scan(
    capacities: &SortedCapacities,
    max_pack_differential: MilliampHours,
    target: MilliampHours,
) -> Attempt {
    let len = capacities.len();
    let mut configuration = Configuration::new();
    let mut skipped = Vec::new();
    let mut start = 0;

    while start < len {
        let window = find_pack(capacities, start, len, max_pack_differential, Some(target));
        if window.is_empty() {
            break;
        }
        if window.start > start {
            skipped.extend_from_slice(&capacities[start..window.start]);
        }
        let Some(pack) = Pack::from_cells(capacities[window.start..window.end].to_vec()) else {
            break;
        };
        trace!(
            index = configuration.len(),
            capacity = window.capacity,
            start = window.start,
            end = window.end,
            "found pack"
        );
        configuration.push(pack);
        start = window.end;
        // Stops one short of the final cell, which is left over.
        if window.end + 1 >= len {
            break;
        }
    }

    Attempt {
        target,
        configuration,
        skipped,
        leftover: capacities[start.min(len)..].to_vec(),
    }
}

/// Assemble a battery from `capacities`.
///
/// A caller-supplied target above the total capacity is scanned from the total instead, since
/// every target at or above it carves the same packs. [`Assembly::initial_target`] still reports
/// the caller's value.
pub fn assemble(
    capacities: &SortedCapacities,
    params: &PackingParams,
) -> Result<Assembly, AssemblyError> {
    let initial = params
        .capacity_target
        .unwrap_or_else(|| initial_target(capacities, params.max_pack_differential));

    let Some(floor) = capacities.smallest() else {
        warn!("no cells to pack");
        return Err(AssemblyError::Infeasible {
            attempts: 0,
            last_target: initial,
            reason: InfeasibleReason::NoCells,
        });
    };

    let total: MilliampHours = capacities.iter().sum();
    let mut target = initial.min(total);
    let mut retries = 0;
    let mut phase = Phase::Scanning;

    loop {
        phase = match phase {
            Phase::Scanning => {
                if target < floor {
                    return Err(infeasible(
                        retries,
                        target,
                        InfeasibleReason::TargetBelowSmallestCell,
                    ));
                }
                if params.max_retries.is_some_and(|max| retries > max) {
                    return Err(infeasible(
                        retries,
                        target,
                        InfeasibleReason::RetriesExhausted,
                    ));
                }
                Phase::Validating(scan(capacities, params.max_pack_differential, target))
            }
            Phase::Validating(attempt) => match check_configuration(
                &attempt.configuration,
                params.max_pack_differential,
                params.max_difference_between_packs,
                params.series_count,
            ) {
                Ok(report) => Phase::Accepted(attempt, report),
                Err(failure) => {
                    debug!(target_mah = target, %failure, "configuration rejected");
                    Phase::Retrying
                }
            },
            Phase::Retrying => {
                target -= TARGET_STEP;
                retries += 1;
                Phase::Scanning
            }
            Phase::Accepted(attempt, report) => {
                let assembly = finish(capacities, params, attempt, report, initial, retries);
                info!(
                    series = assembly.series_count,
                    amp_hours = assembly.amp_hours,
                    watt_hours = assembly.watt_hours,
                    retries = assembly.retries,
                    "battery accepted"
                );
                return Ok(assembly);
            }
        };
    }
}

fn infeasible(
    attempts: usize,
    last_target: MilliampHours,
    reason: InfeasibleReason,
) -> AssemblyError {
    warn!(attempts, last_target, %reason, "giving up");
    AssemblyError::Infeasible {
        attempts,
        last_target,
        reason,
    }
}

/// Build the accepted result: keep the reported packs, discard the rest, derive the ratings.
///
/// `validation` covers the active packs only, which the split never touches.
fn finish(
    capacities: &SortedCapacities,
    params: &PackingParams,
    attempt: Attempt,
    validation: ValidationReport,
    initial_target: MilliampHours,
    retries: usize,
) -> Assembly {
    let Attempt {
        target,
        configuration,
        skipped,
        leftover,
    } = attempt;

    let (configuration, surplus) = configuration.split_at(params.reported_packs());

    let mut discarded = skipped;
    discarded.extend(surplus.into_iter().flat_map(Pack::into_cells));
    discarded.extend(leftover);

    let total_cells = configuration.packs().iter().map(Pack::len).sum();

    let mut pack_capacities: Vec<MilliampHours> = configuration
        .packs()
        .iter()
        .map(Pack::effective_capacity)
        .collect();
    pack_capacities.sort_unstable_by(|a, b| b.cmp(a));
    let largest = pack_capacities.first().copied().unwrap_or(0);
    let smallest = pack_capacities.last().copied().unwrap_or(0);
    let capacity_delta = largest - smallest;

    let amp_hours = derive_amp_hours(&configuration, params.series_count).unwrap_or(0.0);

    Assembly {
        series_count: params.series_count,
        max_pack_differential: params.max_pack_differential,
        max_difference_between_packs: params.max_difference_between_packs,
        configuration,
        discarded,
        input_cells: capacities.len(),
        total_cells,
        pack_capacities,
        capacity_delta,
        delta_percentage: percentage(capacity_delta, largest, PERCENT_DECIMALS),
        amp_hours,
        watt_hours: derive_watt_hours(params.series_count, amp_hours),
        initial_target,
        final_target: target,
        retries,
        validation,
    }
}
