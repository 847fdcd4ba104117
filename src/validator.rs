//! Configuration validator: checks the active packs against both spread constraints.

use crate::constants::PERCENT_DECIMALS;
use crate::metrics::percentage;
use crate::types::{Configuration, MilliampHours};

/// The constraint a configuration broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("only {found} pack(s) assembled, {required} required")]
    TooFewPacks { found: usize, required: usize },

    #[error("pack {index} spreads {spread} mAh, limit is {limit} mAh")]
    PackSpreadExceeded {
        index: usize,
        spread: MilliampHours,
        limit: MilliampHours,
    },

    #[error("active packs differ by {spread} mAh, limit is {limit} mAh")]
    SeriesSpreadExceeded {
        spread: MilliampHours,
        limit: MilliampHours,
    },
}

/// Per-pack line of a successful validation.
#[derive(Debug, Clone, PartialEq)]
pub struct PackSummary {
    pub index: usize,
    pub effective_capacity: MilliampHours,
    pub delta: MilliampHours,
    pub delta_percentage: f64,
    pub cells: Vec<MilliampHours>,
}

/// Outcome of a successful validation over the active packs.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub packs: Vec<PackSummary>,
    pub min_effective_capacity: MilliampHours,
    pub max_effective_capacity: MilliampHours,
}

impl ValidationReport {
    /// Spread of effective capacity across the active packs.
    pub fn series_spread(&self) -> MilliampHours {
        self.max_effective_capacity - self.min_effective_capacity
    }
}

/// Check the first `series_count` packs against both constraints.
///
/// Packs beyond `series_count` are surplus and ignored.
pub fn check_configuration(
    configuration: &Configuration,
    max_pack_differential: MilliampHours,
    max_difference_between_packs: MilliampHours,
    series_count: usize,
) -> Result<ValidationReport, ValidationFailure> {
    if configuration.len() < series_count {
        return Err(ValidationFailure::TooFewPacks {
            found: configuration.len(),
            required: series_count,
        });
    }

    let mut bounds: Option<(MilliampHours, MilliampHours)> = None;
    let mut packs = Vec::with_capacity(series_count);

    for (index, pack) in configuration.active(series_count).iter().enumerate() {
        if pack.spread() > max_pack_differential {
            return Err(ValidationFailure::PackSpreadExceeded {
                index,
                spread: pack.spread(),
                limit: max_pack_differential,
            });
        }

        let capacity = pack.effective_capacity();
        bounds = Some(match bounds {
            None => (capacity, capacity),
            Some((lo, hi)) => (lo.min(capacity), hi.max(capacity)),
        });

        packs.push(PackSummary {
            index,
            effective_capacity: capacity,
            delta: pack.spread(),
            delta_percentage: percentage(pack.spread(), pack.strongest(), PERCENT_DECIMALS),
            cells: pack.cells().to_vec(),
        });
    }

    let (min_effective_capacity, max_effective_capacity) = bounds.unwrap_or((0, 0));
    let spread = max_effective_capacity - min_effective_capacity;
    if spread > max_difference_between_packs {
        return Err(ValidationFailure::SeriesSpreadExceeded {
            spread,
            limit: max_difference_between_packs,
        });
    }

    Ok(ValidationReport {
        packs,
        min_effective_capacity,
        max_effective_capacity,
    })
}

/// `true` when the configuration satisfies both constraints.
pub fn validate(
    configuration: &Configuration,
    max_pack_differential: MilliampHours,
    max_difference_between_packs: MilliampHours,
    series_count: usize,
) -> bool {
    check_configuration(
        configuration,
        max_pack_differential,
        max_difference_between_packs,
        series_count,
    )
    .is_ok()
}

impl std::fmt::Display for PackSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pack {} (Capacity: {} mAh: Delta: {} mAh ({}%)): {:?}",
            self.index, self.effective_capacity, self.delta, self.delta_percentage, self.cells
        )
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for pack in &self.packs {
            writeln!(f, "{}", pack)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Pack;

    fn config(packs: &[&[MilliampHours]]) -> Configuration {
        packs
            .iter()
            .filter_map(|cells| Pack::from_cells(cells.to_vec()))
            .collect()
    }

    #[test]
    fn too_few_packs_fails_regardless_of_contents() {
        let c = config(&[&[3400, 3400]]);
        assert!(!validate(&c, 1000, 1000, 2));
        assert_eq!(
            check_configuration(&c, 1000, 1000, 2),
            Err(ValidationFailure::TooFewPacks {
                found: 1,
                required: 2
            })
        );
    }

    #[test]
    fn pack_spread_violation() {
        let c = config(&[&[3400, 3400], &[3380, 3300]]);
        assert_eq!(
            check_configuration(&c, 50, 1000, 2),
            Err(ValidationFailure::PackSpreadExceeded {
                index: 1,
                spread: 80,
                limit: 50
            })
        );
    }

    #[test]
    fn series_spread_violation() {
        let c = config(&[&[3400, 3400, 3380, 3380], &[3200, 3200]]);
        assert_eq!(
            check_configuration(&c, 50, 500, 2),
            Err(ValidationFailure::SeriesSpreadExceeded {
                spread: 13520 - 6400,
                limit: 500
            })
        );
    }

    #[test]
    fn surplus_packs_are_ignored() {
        // The third pack spreads far beyond the limit but is not active.
        let c = config(&[&[3400, 3400], &[3380, 3380], &[3000, 2000]]);
        let report = check_configuration(&c, 50, 500, 2).unwrap();
        assert_eq!(report.packs.len(), 2);
        assert_eq!(report.min_effective_capacity, 6760);
        assert_eq!(report.max_effective_capacity, 6800);
        assert_eq!(report.series_spread(), 40);
    }

    #[test]
    fn limits_are_inclusive() {
        let c = config(&[&[3400, 3350], &[3350, 3350]]);
        assert!(validate(&c, 50, 0, 2));
    }

    #[test]
    fn report_lines() {
        let c = config(&[&[3400, 3380]]);
        let report = check_configuration(&c, 50, 0, 1).unwrap();
        assert_eq!(
            report.to_string(),
            "Pack 0 (Capacity: 6760 mAh: Delta: 20 mAh (0.588%)): [3400, 3380]\n"
        );
    }
}
