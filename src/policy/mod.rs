/*! Uniprocessor scheduling policies

This module provides the central trait [SchedulingPolicy], which
combines a *job-level* decision rule used by the simulator with the
*task-level* analytic schedulability tests associated with the policy.
Two implementations are provided: earliest-deadline first ([Edf]) and
rate-monotonic ([RateMonotonic]) scheduling.

Policies are stateless: [SchedulingPolicy::select] is a pure function of
the currently active jobs and never modifies them.
*/

use auto_impl::auto_impl;

use crate::job::Job;
use crate::task::TaskSet;

mod edf;
mod rm;

pub use edf::Edf;
pub use rm::{RateMonotonic, RmTest};

/// The outcome of an analytic schedulability test.
///
/// `least_upper_bound` is the policy's utilization bound for the given
/// number of tasks, which is not necessarily the criterion behind
/// `schedulable`. For instance, [RateMonotonic] always reports the
/// Liu & Layland bound, so a task set accepted by the hyperbolic or the
/// response-time test may well have `utilization > least_upper_bound`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyticVerdict {
    pub schedulable: bool,
    pub least_upper_bound: f64,
    pub utilization: f64,
}

/// The main interface for scheduling policies.
#[auto_impl(&, Box, Rc)]
pub trait SchedulingPolicy {
    /// A short, human-readable name of the policy.
    fn name(&self) -> &'static str;

    /// Pick the job that should occupy the processor among the given
    /// `active` jobs, returning its index, or `None` if there is
    /// nothing to run.
    fn select(&self, active: &[Job]) -> Option<usize>;

    /// Analytic schedulability test for the whole task set.
    fn is_schedulable(&self, tasks: &TaskSet) -> bool;

    /// The utilization bound below which any set of `n` tasks is
    /// schedulable under this policy.
    fn least_upper_bound(&self, n: usize) -> f64;

    /// Total utilization of the task set.
    fn utilization(&self, tasks: &TaskSet) -> f64 {
        tasks.utilization()
    }

    /// Bundle the analytic results for reporting.
    fn analyze(&self, tasks: &TaskSet) -> AnalyticVerdict {
        AnalyticVerdict {
            schedulable: self.is_schedulable(tasks),
            least_upper_bound: self.least_upper_bound(tasks.len()),
            utilization: self.utilization(tasks),
        }
    }
}

#[cfg(test)]
mod tests;
