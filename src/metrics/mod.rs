/*! Aggregation of simulation outcomes into per-task and task-set statistics

[Metrics::aggregate] reduces the completed jobs of a run into an
immutable [SimulationResult], which also carries the analytic verdict
of the policy so that both can be compared.
*/

use crate::job::{Job, JobId};
use crate::policy::AnalyticVerdict;
use crate::sim::{Outcome, Segment};
use crate::task::{TaskId, TaskSet};
use crate::time::{Duration, Instant, Lateness};

/// The simulated counterpart of [AnalyticVerdict].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedVerdict {
    pub schedulable: bool,
    pub late_jobs: usize,
    pub max_lateness: Lateness,
}

/// The per-job traces and statistics of one task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskMetrics {
    task: TaskId,
    releases: usize,
    response_times: Vec<(JobId, Duration)>,
    activation_times: Vec<(JobId, Instant)>,
    completion_times: Vec<(JobId, Instant)>,
    lateness: Vec<(JobId, Lateness)>,
}

impl TaskMetrics {
    fn new(task: TaskId, releases: usize) -> Self {
        TaskMetrics {
            task,
            releases,
            response_times: Vec::with_capacity(releases),
            activation_times: Vec::with_capacity(releases),
            completion_times: Vec::with_capacity(releases),
            lateness: Vec::with_capacity(releases),
        }
    }

    fn record(&mut self, job: &Job, finish: Instant, lateness: Lateness) {
        let id = job.id();
        self.response_times
            .push((id.clone(), finish - job.arrival()));
        self.activation_times.push((id.clone(), job.arrival()));
        self.completion_times.push((id.clone(), finish));
        self.lateness.push((id.clone(), lateness));
    }

    pub fn task(&self) -> &TaskId {
        &self.task
    }

    /// The number of jobs the task releases per hyperperiod.
    pub fn releases(&self) -> usize {
        self.releases
    }

    pub fn response_times(&self) -> &[(JobId, Duration)] {
        &self.response_times
    }

    pub fn activation_times(&self) -> &[(JobId, Instant)] {
        &self.activation_times
    }

    pub fn completion_times(&self) -> &[(JobId, Instant)] {
        &self.completion_times
    }

    pub fn lateness(&self) -> &[(JobId, Lateness)] {
        &self.lateness
    }

    /// The largest response time observed for this task.
    pub fn worst_case_response_time(&self) -> Option<Duration> {
        self.response_times.iter().map(|(_, r)| *r).max()
    }

    pub fn average_response_time(&self) -> Option<f64> {
        mean(self.response_times.iter().map(|(_, r)| *r as f64))
    }

    pub fn average_lateness(&self) -> Option<f64> {
        mean(self.lateness.iter().map(|(_, l)| *l as f64))
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (n, sum) = values.fold((0usize, 0.0), |(n, sum), v| (n + 1, sum + v));
    if n > 0 {
        Some(sum / n as f64)
    } else {
        None
    }
}

/// The immutable result of a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    policy: &'static str,
    hyperperiod: Instant,
    completed_jobs: Vec<Job>,
    per_task: Vec<TaskMetrics>,
    average_response_time: f64,
    sum_completion_times: u64,
    preemptions: usize,
    schedule: Vec<Segment>,
    analytic: AnalyticVerdict,
    simulated: SimulatedVerdict,
}

impl SimulationResult {
    /// The name of the policy that produced this result.
    pub fn policy(&self) -> &'static str {
        self.policy
    }

    pub fn hyperperiod(&self) -> Instant {
        self.hyperperiod
    }

    /// All jobs, in order of completion.
    pub fn completed_jobs(&self) -> &[Job] {
        &self.completed_jobs
    }

    /// Per-task traces, in task-set order.
    pub fn per_task(&self) -> &[TaskMetrics] {
        &self.per_task
    }

    pub fn task(&self, id: &TaskId) -> Option<&TaskMetrics> {
        self.per_task.iter().find(|m| &m.task == id)
    }

    /// Mean response time over all completed jobs (zero if none).
    pub fn average_response_time(&self) -> f64 {
        self.average_response_time
    }

    pub fn sum_completion_times(&self) -> u64 {
        self.sum_completion_times
    }

    pub fn preemptions(&self) -> usize {
        self.preemptions
    }

    /// The execution trace of the run.
    pub fn schedule(&self) -> &[Segment] {
        &self.schedule
    }

    pub fn analytic(&self) -> AnalyticVerdict {
        self.analytic
    }

    pub fn simulated(&self) -> SimulatedVerdict {
        self.simulated
    }

    pub fn max_lateness(&self) -> Lateness {
        self.simulated.max_lateness
    }

    pub fn late_jobs(&self) -> usize {
        self.simulated.late_jobs
    }

    /// Do the analytic test and the simulation reach the same verdict?
    ///
    /// They need not: the simulation observes a single hyperperiod for
    /// one realization of execution times, whereas the analytic tests
    /// are sufficient (or exact) conditions over all realizations up
    /// to the WCET.
    pub fn verdicts_agree(&self) -> bool {
        self.analytic.schedulable == self.simulated.schedulable
    }
}

/// The reducer turning a simulation [Outcome] into a [SimulationResult].
pub struct Metrics;

impl Metrics {
    pub fn aggregate(
        policy: &'static str,
        tasks: &TaskSet,
        outcome: Outcome,
        analytic: AnalyticVerdict,
    ) -> SimulationResult {
        let mut per_task: Vec<TaskMetrics> = tasks
            .iter()
            .map(|t| {
                let releases = tasks.hyperperiod() / t.period();
                TaskMetrics::new(t.id().clone(), releases as usize)
            })
            .collect();

        let mut late_jobs = 0;
        let mut max_lateness: Option<Lateness> = None;
        let mut sum_response_times: u64 = 0;
        let mut sum_completion_times: u64 = 0;

        for job in &outcome.completed {
            let (finish, lateness) = match (job.finish(), job.lateness()) {
                (Some(f), Some(l)) => (f, l),
                // not reachable for jobs handed out by the simulator
                _ => continue,
            };
            if job.is_late() {
                late_jobs += 1;
            }
            max_lateness = Some(max_lateness.map_or(lateness, |m| m.max(lateness)));
            sum_response_times = sum_response_times.saturating_add(finish - job.arrival());
            sum_completion_times = sum_completion_times.saturating_add(finish);
            if let Some(m) = per_task.iter_mut().find(|m| &m.task == job.task_id()) {
                m.record(job, finish, lateness);
            }
        }

        let average_response_time = if outcome.completed.is_empty() {
            0.0
        } else {
            sum_response_times as f64 / outcome.completed.len() as f64
        };

        let simulated = SimulatedVerdict {
            schedulable: late_jobs == 0,
            late_jobs,
            max_lateness: max_lateness.unwrap_or(0),
        };

        if analytic.schedulable != simulated.schedulable {
            log::warn!(
                "{}: analytic verdict (schedulable = {}) disagrees with simulation ({} late jobs)",
                policy,
                analytic.schedulable,
                late_jobs
            );
        }

        SimulationResult {
            policy,
            hyperperiod: tasks.hyperperiod(),
            completed_jobs: outcome.completed,
            per_task,
            average_response_time,
            sum_completion_times,
            preemptions: outcome.preemptions,
            schedule: outcome.schedule,
            analytic,
            simulated,
        }
    }
}
