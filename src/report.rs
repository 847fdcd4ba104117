// Human-readable reports. Plain `Display` renderings; nothing here feeds back into packing.

use crate::assembly::Assembly;
use crate::types::{MilliampHours, PackingParams};

/// Opening line printed before assembly starts.
pub fn describe_run(params: &PackingParams, initial_target: MilliampHours) -> String {
    format!(
        "Computing {}S battery with parallel packs differing by a maximum of {} mAh and series \
         packs differing by a maximum of {} mAh. Initial capacity target is `{}` mAh...",
        params.series_count,
        params.max_pack_differential,
        params.max_difference_between_packs,
        initial_target,
    )
}

/// `{}` prints the per-pack report and the rating headline; `{:#}` adds the capacity delta
/// and discarded cells.
impl std::fmt::Display for Assembly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.validation)?;
        write!(
            f,
            "Pack is valid. Created {}S {} Ah ({} Wh) battery pack.",
            self.series_count, self.amp_hours, self.watt_hours
        )?;
        if f.alternate() {
            writeln!(f)?;
            writeln!(
                f,
                "Maximum capacity delta between packs is {} ({}%)",
                self.capacity_delta, self.delta_percentage
            )?;
            writeln!(f, "Total Cells: {} / {}", self.total_cells, self.input_cells)?;
            write!(
                f,
                "Discarded Cells: {} -> {:?}",
                self.discarded.len(),
                self.discarded
            )?;
        }
        Ok(())
    }
}
