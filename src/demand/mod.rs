/*! Processor demand and the exact EDF schedulability test

This module provides the trait [DemandBound], which models the notion
of a *demand-bound function* (DBF): the maximum cumulative execution
time of all jobs that both arrive and have their deadline within any
interval of length `t`. The DBF of a periodic task is

```text
dbf(t) = (floor((t - D) / T) + 1) * C    if t >= D, and 0 otherwise.
```

Based on it, [first_violation] and [is_edf_schedulable] implement the
processor-demand criterion: a periodic task set is EDF-schedulable on a
dedicated uniprocessor iff `dbf(t) <= t` for every point `t` up to the
hyperperiod at which the total DBF steps.
*/

use auto_impl::auto_impl;

use crate::task::TaskSet;
use crate::time::{Duration, Instant, Service};

/// The general interface for (cumulative) processor demand bounds.
#[auto_impl(&, Box, Rc)]
pub trait DemandBound {
    /// Bound the total execution time of jobs with both release and
    /// deadline in any interval of length `t`.
    fn demand(&self, t: Duration) -> Service;

    /// Yield the interval lengths, in increasing order, at which the
    /// demand bound steps.
    fn steps_iter<'a>(&'a self) -> Box<dyn Iterator<Item = Duration> + 'a>;
}

mod aggregate;
mod dbf;

pub use aggregate::Aggregate;

/// A point at which the processor demand exceeds the supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemandViolation {
    pub at: Instant,
    pub demand: Service,
}

/// The candidate points of the processor-demand test: all absolute
/// deadlines `D_i + k * T_i` up to the hyperperiod, ascending and
/// without duplicates.
pub fn check_points(tasks: &TaskSet) -> Vec<Instant> {
    let total = Aggregate::new(tasks.iter().collect());
    let horizon = tasks.hyperperiod();
    total.steps_iter().take_while(|t| *t <= horizon).collect()
}

/// Find the first check point at which the cumulative demand exceeds
/// the elapsed time, if any.
pub fn first_violation(tasks: &TaskSet) -> Option<DemandViolation> {
    let total = Aggregate::new(tasks.iter().collect());
    let horizon = tasks.hyperperiod();
    let violation = total
        .steps_iter()
        .take_while(|t| *t <= horizon)
        .map(|t| DemandViolation {
            at: t,
            demand: total.demand(t),
        })
        .find(|v| v.demand > v.at);
    violation
}

/// The processor-demand criterion for EDF. An empty task set, or one
/// without any check point within the hyperperiod, is trivially
/// schedulable.
pub fn is_edf_schedulable(tasks: &TaskSet) -> bool {
    match first_violation(tasks) {
        None => true,
        Some(v) => {
            log::debug!(
                "processor demand {} exceeds supply at t = {}",
                v.demand,
                v.at
            );
            false
        }
    }
}
