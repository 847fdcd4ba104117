// Post-conditions every accepted assembly must satisfy.

use crate::assembly::Assembly;
use crate::types::Pack;

/// Every active pack stays within the cell differential.
pub fn packs_within_cell_differential(assembly: &Assembly) -> bool {
    assembly
        .active_packs()
        .iter()
        .all(|pack| pack.spread() <= assembly.max_pack_differential)
}

/// Effective capacities of the active packs stay within the pack differential.
pub fn series_within_pack_differential(assembly: &Assembly) -> bool {
    let capacities = assembly.active_packs().iter().map(Pack::effective_capacity);
    match (capacities.clone().min(), capacities.max()) {
        (Some(lo), Some(hi)) => hi - lo <= assembly.max_difference_between_packs,
        _ => false,
    }
}

/// Exactly `series_count` packs are active.
pub fn active_pack_count(assembly: &Assembly) -> bool {
    assembly.active_packs().len() == assembly.series_count
}

/// Each input cell ends up either in a retained pack or in the discard list.
pub fn cells_conserved(assembly: &Assembly) -> bool {
    assembly.total_cells + assembly.discarded.len() == assembly.input_cells
}

/// No retained pack is empty.
pub fn packs_non_empty(assembly: &Assembly) -> bool {
    assembly.configuration.packs().iter().all(|pack| !pack.is_empty())
}

/// All individual invariants with names for reporting.
pub const ALL_INVARIANTS: &[(&str, fn(&Assembly) -> bool)] = &[
    ("packsWithinCellDifferential", packs_within_cell_differential),
    ("seriesWithinPackDifferential", series_within_pack_differential),
    ("activePackCount", active_pack_count),
    ("cellsConserved", cells_conserved),
    ("packsNonEmpty", packs_non_empty),
];

/// Check all invariants and return the name of the first violated one, if any.
pub fn check_invariants(assembly: &Assembly) -> Result<(), &'static str> {
    for (name, check) in ALL_INVARIANTS {
        if !check(assembly) {
            return Err(*name);
        }
    }
    Ok(())
}
