// Randomized self-check: packs seeded random cell batches and checks the finder bound and the
// assembly invariants on every result.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::assembly::assemble;
use crate::finder::find_pack;
use crate::invariants;
use crate::types::{MilliampHours, PackingParams, SortedCapacities};

/// Smallest and largest capacity a generated cell can have.
const CELL_RANGE: (MilliampHours, MilliampHours) = (1800, 3600);

/// One generated run: the cells and the parameters they were packed with.
#[derive(Debug, Clone)]
pub struct Sample {
    pub capacities: SortedCapacities,
    pub params: PackingParams,
}

/// Draw a random batch of cells and parameters.
///
/// Cells are clustered around a handful of production lots so that packs actually form.
pub fn random_sample(batch_size: usize, rng: &mut impl Rng) -> Sample {
    let lots = rng.gen_range(1..=4);
    let centres: Vec<MilliampHours> = (0..lots)
        .map(|_| rng.gen_range(CELL_RANGE.0..=CELL_RANGE.1))
        .collect();
    let cells = (0..batch_size.max(1))
        .map(|_| {
            let centre = centres[rng.gen_range(0..centres.len())];
            (centre + rng.gen_range(-60..=60)).max(1)
        })
        .collect();

    let series_count = rng.gen_range(1..=batch_size.clamp(1, 6));
    let params = PackingParams::new(
        series_count,
        rng.gen_range(0..=120),
        rng.gen_range(0..=3000),
    )
    .with_max_retries(rng.gen_range(50..=400));

    Sample {
        capacities: SortedCapacities::from_unsorted(cells),
        params,
    }
}

/// Check one sample. Returns `Ok(true)` when accepted, `Ok(false)` when infeasible, and the
/// violated property otherwise.
pub fn check_sample(sample: &Sample) -> Result<bool, &'static str> {
    let caps = &sample.capacities;
    let limit = sample.params.max_pack_differential;
    let window = find_pack(caps, 0, caps.len(), limit, None);
    if !window.is_empty() && caps[window.start] - caps[window.end - 1] > limit {
        return Err("finderWithinDifferential");
    }

    match assemble(caps, &sample.params) {
        Ok(assembly) => invariants::check_invariants(&assembly).map(|()| true),
        Err(_) => Ok(false),
    }
}

pub struct ViolationInfo {
    pub invariant: &'static str,
    pub sample: usize,
    pub capacities: Vec<MilliampHours>,
    pub params: PackingParams,
}

pub struct SimulationResult {
    pub max_samples: usize,
    pub batch_size: usize,
    pub seed: u64,
    pub accepted: usize,
    pub infeasible: usize,
    pub elapsed: std::time::Duration,
    pub violation: Option<ViolationInfo>,
}

/// Run `max_samples` random samples from `seed`, stopping at the first violation.
pub fn run_simulation(max_samples: usize, batch_size: usize, seed: u64) -> SimulationResult {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = std::time::Instant::now();
    let mut accepted = 0;
    let mut infeasible = 0;
    let mut violation = None;

    for sample_num in 0..max_samples {
        let sample = random_sample(batch_size, &mut rng);
        match check_sample(&sample) {
            Ok(true) => accepted += 1,
            Ok(false) => infeasible += 1,
            Err(name) => {
                violation = Some(ViolationInfo {
                    invariant: name,
                    sample: sample_num,
                    capacities: sample.capacities.as_slice().to_vec(),
                    params: sample.params,
                });
                break;
            }
        }
    }

    SimulationResult {
        max_samples,
        batch_size,
        seed,
        accepted,
        infeasible,
        elapsed: start.elapsed(),
        violation,
    }
}

impl std::fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let samples_per_sec = self.max_samples as f64 / self.elapsed.as_secs_f64().max(1e-9);
        writeln!(f)?;
        match &self.violation {
            None => {
                writeln!(
                    f,
                    "[ok] No violation found ({:.0}ms at {:.0} samples/second).",
                    self.elapsed.as_millis(),
                    samples_per_sec,
                )?;
                writeln!(
                    f,
                    "Checked {} batches of {} cells: {} accepted, {} infeasible.",
                    self.max_samples, self.batch_size, self.accepted, self.infeasible,
                )?;
            }
            Some(v) => {
                writeln!(
                    f,
                    "[VIOLATION] Invariant '{}' violated at sample {}.",
                    v.invariant, v.sample,
                )?;
                writeln!(f, "Parameters: {:?}", v.params)?;
                writeln!(f, "Capacities: {:?}", v.capacities)?;
            }
        }
        writeln!(f, "Seed: {} ", self.seed)
    }
}
