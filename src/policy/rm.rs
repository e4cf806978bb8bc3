//! Rate-monotonic (**RM**) scheduling

use super::SchedulingPolicy;
use crate::fixed_priority;
use crate::job::Job;
use crate::task::TaskSet;

/// The analytic test used by [RateMonotonic::is_schedulable].
///
/// Several tests for RM are in common use and they do not agree in
/// general. [RmTest::LiuLayland] is the default; the others can be
/// selected with [RateMonotonic::with_test].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RmTest {
    /// Liu & Layland: `U <= n (2^(1/n) - 1)`. Sufficient only.
    #[default]
    LiuLayland,
    /// Bini et al.: `Π (U_i + 1) <= 2`. Sufficient, and never more
    /// pessimistic than the Liu & Layland bound.
    Hyperbolic,
    /// Exact response-time analysis: every task's worst-case response
    /// time must not exceed its deadline.
    ResponseTime,
}

/// Fully preemptive rate-monotonic scheduling: static priorities, the
/// shorter the period the higher the priority. Ties are broken by task
/// id, and among jobs of the same task, by arrival time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateMonotonic {
    test: RmTest,
}

impl RateMonotonic {
    pub fn new() -> Self {
        RateMonotonic::default()
    }

    /// Use `test` for [SchedulingPolicy::is_schedulable]. The reported
    /// [least_upper_bound][SchedulingPolicy::least_upper_bound] remains
    /// the Liu & Layland bound regardless of the chosen test.
    pub fn with_test(test: RmTest) -> Self {
        RateMonotonic { test }
    }

    pub fn test(&self) -> RmTest {
        self.test
    }

    /// The Liu & Layland utilization bound `n (2^(1/n) - 1)`.
    pub fn liu_layland_bound(n: usize) -> f64 {
        if n == 0 {
            return 1.0;
        }
        let n = n as f64;
        n * (2f64.powf(1.0 / n) - 1.0)
    }

    pub fn liu_layland_test(tasks: &TaskSet) -> bool {
        tasks.utilization() <= Self::liu_layland_bound(tasks.len())
    }

    pub fn hyperbolic_test(tasks: &TaskSet) -> bool {
        let product: f64 = tasks.iter().map(|t| t.utilization() + 1.0).product();
        product <= 2.0
    }
}

impl SchedulingPolicy for RateMonotonic {
    fn name(&self) -> &'static str {
        "RM"
    }

    fn select(&self, active: &[Job]) -> Option<usize> {
        active
            .iter()
            .enumerate()
            .min_by_key(|&(_, j)| (j.period(), j.task_id(), j.arrival()))
            .map(|(i, _)| i)
    }

    fn is_schedulable(&self, tasks: &TaskSet) -> bool {
        match self.test {
            RmTest::LiuLayland => Self::liu_layland_test(tasks),
            RmTest::Hyperbolic => Self::hyperbolic_test(tasks),
            RmTest::ResponseTime => fixed_priority::is_schedulable(tasks),
        }
    }

    fn least_upper_bound(&self, n: usize) -> f64 {
        Self::liu_layland_bound(n)
    }
}
