/*! Job records: individual releases of periodic tasks

Each [Job] is created by the [JobFactory] when a simulation is set up
and is subsequently owned by the simulation engine, which is the only
component that advances its execution. Once a job completes, its
finish time, response time and lateness are fixed.
*/

use std::fmt;

use crate::sim::SimulationError;
use crate::task::{Task, TaskId};
use crate::time::{self, Duration, Instant, Lateness, Service};

mod factory;

pub use factory::{ExecutionTimeModel, JobFactory, Releases, Uniform, WorstCase};

/// The unique key of a job: the task it belongs to and its activation time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId {
    pub task: TaskId,
    pub activation: Instant,
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.task, self.activation)
    }
}

/// One release of a periodic task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    id: JobId,
    period: Duration,
    arrival: Instant,
    deadline: Instant,
    cost: Service,
    remaining: Service,
    start: Option<Instant>,
    finish: Option<Instant>,
    executing: bool,
}

impl Job {
    /// Create the release of `task` at time `arrival` with an execution
    /// requirement of `cost`.
    pub fn new(task: &Task, arrival: Instant, cost: Service) -> Job {
        Job {
            id: JobId {
                task: task.id().clone(),
                activation: arrival,
            },
            period: task.period(),
            arrival,
            deadline: arrival + task.deadline(),
            cost,
            remaining: cost,
            start: None,
            finish: None,
            executing: false,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn task_id(&self) -> &TaskId {
        &self.id.task
    }

    /// The period of the task that released this job.
    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn arrival(&self) -> Instant {
        self.arrival
    }

    /// The absolute deadline, i.e., arrival plus relative deadline.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// The total execution requirement of this job.
    pub fn cost(&self) -> Service {
        self.cost
    }

    pub fn remaining(&self) -> Service {
        self.remaining
    }

    /// The time at which the job was first scheduled, if ever.
    pub fn start(&self) -> Option<Instant> {
        self.start
    }

    pub fn finish(&self) -> Option<Instant> {
        self.finish
    }

    pub fn is_executing(&self) -> bool {
        self.executing
    }

    pub fn is_complete(&self) -> bool {
        self.finish.is_some()
    }

    /// Finish time minus arrival time; only defined after completion.
    pub fn response_time(&self) -> Option<Duration> {
        self.finish.map(|f| f - self.arrival)
    }

    /// Finish time minus absolute deadline; only defined after completion.
    pub fn lateness(&self) -> Option<Lateness> {
        self.finish.map(|f| time::signed_diff(f, self.deadline))
    }

    /// A job is late iff it completed after its deadline.
    pub fn is_late(&self) -> bool {
        matches!(self.finish, Some(f) if f > self.deadline)
    }

    pub(crate) fn set_executing(&mut self, executing: bool, now: Instant) {
        if executing && self.start.is_none() {
            self.start = Some(now);
        }
        self.executing = executing;
    }

    /// Consume `amount` units of the remaining execution requirement.
    pub(crate) fn execute(&mut self, amount: Service) -> Result<(), SimulationError> {
        match self.remaining.checked_sub(amount) {
            Some(rest) => {
                self.remaining = rest;
                Ok(())
            }
            None => Err(SimulationError::OverExecution {
                job: self.id.clone(),
                by: amount - self.remaining,
            }),
        }
    }

    /// Record completion at `now`. Only valid once nothing remains.
    pub(crate) fn complete(&mut self, now: Instant) {
        debug_assert_eq!(self.remaining, 0);
        debug_assert!(self.finish.is_none());
        self.executing = false;
        self.finish = Some(now);
    }
}
