use super::solution::sum_present;
use crate::model::{GrowthRun, GrowthStep};

/// Order steps by their index when every step carries one; file order otherwise
pub fn order_steps(steps: &mut [GrowthStep]) {
    if steps.iter().all(|s| s.index.is_some()) {
        steps.sort_by_key(|s| s.index);
    }
}

/// Calculated run duration as the sum of step durations
pub fn calculate_duration(run: &mut GrowthRun) {
    run.duration.calculated = sum_present(run.steps.iter().map(|s| s.duration));
}

/// Derive every quantity of an assembled growth run
pub fn finish(run: &mut GrowthRun) {
    order_steps(&mut run.steps);
    calculate_duration(run);
}
