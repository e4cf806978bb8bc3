//! Earliest-deadline first (**EDF**) scheduling

use super::SchedulingPolicy;
use crate::demand;
use crate::job::Job;
use crate::task::TaskSet;

/// Fully preemptive earliest-deadline first scheduling.
///
/// Jobs are prioritized in order of increasing absolute deadlines.
/// Ties are broken in favor of the job that is already executing (to
/// avoid needless preemptions), then in favor of the job whose task
/// has the shorter period, then by arrival time and task id.
#[derive(Debug, Clone, Copy, Default)]
pub struct Edf;

impl Edf {
    pub fn new() -> Self {
        Edf
    }
}

impl SchedulingPolicy for Edf {
    fn name(&self) -> &'static str {
        "EDF"
    }

    fn select(&self, active: &[Job]) -> Option<usize> {
        active
            .iter()
            .enumerate()
            .min_by_key(|&(_, j)| {
                (
                    j.deadline(),
                    !j.is_executing(),
                    j.period(),
                    j.arrival(),
                    j.task_id(),
                )
            })
            .map(|(i, _)| i)
    }

    /// For implicit deadlines, `U <= 1` is exact. Otherwise `U <= 1`
    /// is only necessary, and the processor-demand criterion decides.
    fn is_schedulable(&self, tasks: &TaskSet) -> bool {
        if tasks.has_implicit_deadlines() {
            tasks.utilization_at_most_one()
        } else {
            tasks.utilization_at_most_one() && demand::is_edf_schedulable(tasks)
        }
    }

    fn least_upper_bound(&self, _n: usize) -> f64 {
        1.0
    }
}
