// Types for cells, packs and configurations.

use std::ops::Deref;

/// A single cell's measured capacity in mAh.
pub type MilliampHours = i64;

/// Cell capacities sorted descending.
///
/// Only constructible through [`SortedCapacities::from_unsorted`], so every holder can rely on
/// `self[i] >= self[i + 1]`. The window scan depends on that ordering: the first cell of any
/// contiguous range is its largest and the last is its smallest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedCapacities(Vec<MilliampHours>);

impl SortedCapacities {
    pub fn from_unsorted(mut capacities: Vec<MilliampHours>) -> Self {
        capacities.sort_unstable_by(|a, b| b.cmp(a));
        Self(capacities)
    }

    pub fn as_slice(&self) -> &[MilliampHours] {
        &self.0
    }

    pub fn largest(&self) -> Option<MilliampHours> {
        self.0.first().copied()
    }

    pub fn smallest(&self) -> Option<MilliampHours> {
        self.0.last().copied()
    }
}

impl Deref for SortedCapacities {
    type Target = [MilliampHours];

    fn deref(&self) -> &[MilliampHours] {
        &self.0
    }
}

/// A window returned by the pack finder: the half-open range `start..end` and its summed
/// capacity. The empty window `(0, 0, 0)` means no valid pack exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackWindow {
    pub capacity: MilliampHours,
    pub start: usize,
    pub end: usize,
}

impl PackWindow {
    pub const EMPTY: PackWindow = PackWindow {
        capacity: 0,
        start: 0,
        end: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.capacity == 0
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Cells wired in parallel. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pack {
    cells: Vec<MilliampHours>,
    strongest: MilliampHours,
    weakest: MilliampHours,
}

impl Pack {
    /// Returns `None` for an empty cell list.
    pub fn from_cells(cells: Vec<MilliampHours>) -> Option<Self> {
        let strongest = cells.iter().copied().max()?;
        let weakest = cells.iter().copied().min()?;
        Some(Self {
            cells,
            strongest,
            weakest,
        })
    }

    pub fn cells(&self) -> &[MilliampHours] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn strongest(&self) -> MilliampHours {
        self.strongest
    }

    pub fn weakest(&self) -> MilliampHours {
        self.weakest
    }

    /// Internal spread: strongest minus weakest cell.
    pub fn spread(&self) -> MilliampHours {
        self.strongest - self.weakest
    }

    /// Usable capacity of the parallel group, bounded by its weakest cell.
    pub fn effective_capacity(&self) -> MilliampHours {
        self.cells.len() as MilliampHours * self.weakest
    }

    pub fn into_cells(self) -> Vec<MilliampHours> {
        self.cells
    }
}

/// Packs in assembly order. Index `i` is pack `i`; the first `series_count` packs are active.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Configuration {
    packs: Vec<Pack>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pack: Pack) {
        self.packs.push(pack);
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }

    pub fn packs(&self) -> &[Pack] {
        &self.packs
    }

    /// The packs that form the battery: those with index below `series_count`.
    pub fn active(&self, series_count: usize) -> &[Pack] {
        &self.packs[..series_count.min(self.packs.len())]
    }

    /// Splits into the first `keep` packs and the remainder.
    pub fn split_at(mut self, keep: usize) -> (Configuration, Vec<Pack>) {
        let rest = self.packs.split_off(keep.min(self.packs.len()));
        (self, rest)
    }
}

impl FromIterator<Pack> for Configuration {
    fn from_iter<I: IntoIterator<Item = Pack>>(iter: I) -> Self {
        Self {
            packs: iter.into_iter().collect(),
        }
    }
}

/// Parameters handed to the assembly loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackingParams {
    pub series_count: usize,
    /// Largest allowed spread between cells of one pack.
    pub max_pack_differential: MilliampHours,
    /// Largest allowed spread of effective capacity across active packs.
    pub max_difference_between_packs: MilliampHours,
    /// Initial finder target. `None` starts from the largest pack the finder can build.
    pub capacity_target: Option<MilliampHours>,
    /// Packs retained after acceptance. `None` retains exactly `series_count`.
    pub max_reported_packs: Option<usize>,
    /// Upper bound on failed attempts before giving up. `None` relies on the target floor.
    pub max_retries: Option<usize>,
}

impl PackingParams {
    pub fn new(
        series_count: usize,
        max_pack_differential: MilliampHours,
        max_difference_between_packs: MilliampHours,
    ) -> Self {
        Self {
            series_count,
            max_pack_differential,
            max_difference_between_packs,
            capacity_target: None,
            max_reported_packs: None,
            max_retries: None,
        }
    }

    pub fn with_capacity_target(mut self, target: MilliampHours) -> Self {
        self.capacity_target = Some(target);
        self
    }

    pub fn with_max_reported_packs(mut self, packs: usize) -> Self {
        self.max_reported_packs = Some(packs);
        self
    }

    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Packs kept after acceptance; never fewer than the active packs.
    pub fn reported_packs(&self) -> usize {
        self.max_reported_packs
            .unwrap_or(self.series_count)
            .max(self.series_count)
    }
}
