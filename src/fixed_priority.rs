//! RTA for fully preemptive rate-monotonic scheduling of periodic tasks

use crate::fixed_point;
use crate::task::{Task, TaskId, TaskSet};
use crate::time::Service;

/// Order the tasks by decreasing rate-monotonic priority, i.e., by
/// increasing period, with ties broken by task id.
pub fn priority_order(tasks: &TaskSet) -> Vec<&Task> {
    let mut by_priority: Vec<&Task> = tasks.iter().collect();
    by_priority.sort_by(|a, b| {
        a.period()
            .cmp(&b.period())
            .then_with(|| a.id().cmp(b.id()))
    });
    by_priority
}

/// Bound the maximum response time of the task under analysis `tua`
/// under fully-preemptive fixed-priority scheduling on a dedicated,
/// ideal uniprocessor, where `higher_priority` lists all tasks of
/// higher priority.
///
/// The deadline of `tua` may exceed its period, in which case several
/// of its jobs can be pending at once. The analysis therefore
/// considers every job in the level-`i` busy window that starts with a
/// synchronous release: the `k`-th job (counting from one) completes at
/// the least fixed point of
///
/// ```text
/// w_k = k * C + Σ ceil(w_k / T_j) * C_j
/// ```
///
/// and its response time is `w_k - (k - 1) * T`. The busy window ends
/// with the first job that completes before the next release of
/// `tua`. If any job's response time exceeds the deadline, a
/// [SearchFailure][fixed_point::SearchFailure] is returned.
pub fn dedicated_uniproc_rta(tua: &Task, higher_priority: &[&Task]) -> fixed_point::SearchResult {
    let mut bound = 0;
    for k in 1u64.. {
        let offset = (k - 1).saturating_mul(tua.period());
        let own = k.saturating_mul(tua.wcet());
        let completion = fixed_point::search(offset.saturating_add(tua.deadline()), |w| {
            higher_priority
                .iter()
                .map(|hp| hp.service_needed(w))
                .fold(own, Service::saturating_add)
        })?;
        bound = bound.max(completion - offset);
        if completion <= offset.saturating_add(tua.period()) {
            break;
        }
    }
    Ok(bound)
}

/// Apply [dedicated_uniproc_rta] to every task of `tasks`, yielding
/// results in priority order.
pub fn response_time_bounds(tasks: &TaskSet) -> Vec<(TaskId, fixed_point::SearchResult)> {
    let by_priority = priority_order(tasks);
    by_priority
        .iter()
        .enumerate()
        .map(|(i, tua)| {
            (
                tua.id().clone(),
                dedicated_uniproc_rta(tua, &by_priority[..i]),
            )
        })
        .collect()
}

/// Is the task set schedulable under rate-monotonic priorities
/// according to response-time analysis?
pub fn is_schedulable(tasks: &TaskSet) -> bool {
    response_time_bounds(tasks)
        .into_iter()
        .all(|(_, bound)| bound.is_ok())
}
