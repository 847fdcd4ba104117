//! Sliding-window pack finder.
//!
//! Because capacities are sorted descending, any set of cells whose spread stays within a bound
//! can be taken as a contiguous range. One left-to-right pass over the range therefore finds the
//! highest-capacity valid window without searching subsets.

use crate::types::{MilliampHours, PackWindow, SortedCapacities};

/// Find the highest-capacity window in `capacities[start..end]` whose spread is at most
/// `max_differential`.
///
/// With a `target`, the scan stops as soon as a window would exceed it and returns the best
/// window seen before that point. This favours packs near the beginning of the range over a
/// globally optimal one further on. `None` leaves the target unbounded.
///
/// Returns [`PackWindow::EMPTY`] when no valid window exists or `max_differential` is negative.
pub fn find_pack(
    capacities: &SortedCapacities,
    start: usize,
    end: usize,
    max_differential: MilliampHours,
    target: Option<MilliampHours>,
) -> PackWindow {
    let end = end.min(capacities.len());
    if start >= end || max_differential < 0 {
        return PackWindow::EMPTY;
    }

    let mut scan = WindowScan {
        capacities: capacities.as_slice(),
        max_differential,
        target,
        window_start: start,
        sum: 0,
        best: PackWindow::EMPTY,
    };

    for index in start..end {
        let within_spread = scan.spread_to(index) <= max_differential;
        if within_spread {
            scan.sum += capacities[index];
        } else {
            // Drop the largest cell and take the current one in its place.
            scan.sum = scan.sum - capacities[scan.window_start] + capacities[index];
            scan.window_start += 1;
        }
        if scan.exceeds_target() {
            return scan.best;
        }
        scan.record(index);
    }

    scan.best
}

/// Running state of one scan: the window is `window_start..=index` and `sum` is its total.
struct WindowScan<'a> {
    capacities: &'a [MilliampHours],
    max_differential: MilliampHours,
    target: Option<MilliampHours>,
    window_start: usize,
    sum: MilliampHours,
    best: PackWindow,
}

impl WindowScan<'_> {
    fn spread_to(&self, index: usize) -> MilliampHours {
        self.capacities[self.window_start] - self.capacities[index]
    }

    fn exceeds_target(&self) -> bool {
        self.target.is_some_and(|target| self.sum > target)
    }

    fn record(&mut self, index: usize) {
        if self.sum > self.best.capacity && self.spread_to(index) <= self.max_differential {
            self.best = PackWindow {
                capacity: self.sum,
                start: self.window_start,
                end: index + 1,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(values: &[MilliampHours]) -> SortedCapacities {
        SortedCapacities::from_unsorted(values.to_vec())
    }

    const SCENARIO: &[MilliampHours] = &[3400, 3400, 3380, 3380, 3200, 3200, 3000, 3000];

    #[test]
    fn unbounded_finds_largest_window() {
        let caps = sorted(SCENARIO);
        let window = find_pack(&caps, 0, caps.len(), 50, None);
        assert_eq!(
            window,
            PackWindow {
                capacity: 13560,
                start: 0,
                end: 4
            }
        );
    }

    #[test]
    fn target_stops_at_first_boundary() {
        let caps = sorted(SCENARIO);
        let window = find_pack(&caps, 0, caps.len(), 50, Some(13460));
        assert_eq!((window.start, window.end, window.capacity), (0, 3, 10180));

        let window = find_pack(&caps, 0, caps.len(), 50, Some(10160));
        assert_eq!((window.start, window.end, window.capacity), (0, 2, 6800));
    }

    #[test]
    fn scan_from_offset() {
        let caps = sorted(SCENARIO);
        let window = find_pack(&caps, 4, caps.len(), 50, None);
        assert_eq!((window.start, window.end, window.capacity), (4, 6, 6400));
    }

    #[test]
    fn skips_dissimilar_leading_cell() {
        let caps = sorted(&[4000, 3400, 3400]);
        let window = find_pack(&caps, 0, caps.len(), 50, None);
        assert_eq!((window.start, window.end, window.capacity), (1, 3, 6800));
    }

    #[test]
    fn lone_cell_is_a_valid_pack() {
        let caps = sorted(&[4000, 3000, 2000]);
        let window = find_pack(&caps, 0, caps.len(), 50, None);
        assert_eq!((window.start, window.end, window.capacity), (0, 1, 4000));
    }

    #[test]
    fn first_cell_over_target_yields_empty() {
        let caps = sorted(&[4000, 3000, 2000]);
        assert!(find_pack(&caps, 0, caps.len(), 50, Some(3900)).is_empty());
    }

    #[test]
    fn empty_range_yields_empty() {
        let caps = sorted(SCENARIO);
        assert_eq!(find_pack(&caps, 8, 8, 50, None), PackWindow::EMPTY);
        assert_eq!(find_pack(&caps, 5, 3, 50, None), PackWindow::EMPTY);
    }

    #[test]
    fn end_is_clamped_to_length() {
        let caps = sorted(&[3000, 3000]);
        let window = find_pack(&caps, 0, 99, 0, None);
        assert_eq!((window.start, window.end, window.capacity), (0, 2, 6000));
    }

    #[test]
    fn zero_differential_groups_equal_cells() {
        let caps = sorted(&[3100, 3000, 3000, 3000, 2900]);
        let window = find_pack(&caps, 0, caps.len(), 0, None);
        assert_eq!((window.start, window.end, window.capacity), (1, 4, 9000));
    }
}
