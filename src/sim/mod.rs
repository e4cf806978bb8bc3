/*! The discrete-event simulation engine

The [Simulator] drives a single, dedicated processor through one
hyperperiod of job releases. Rather than stepping time unit by unit, it
lets the selected job run until it either completes or the next job
arrives, since these are the only instants at which a scheduling
decision can change. Preemption is ideal: no overhead is charged and a
preempted job keeps all of its progress.
*/

use std::collections::BTreeMap;

use thiserror::Error;

use crate::job::{Job, JobId, Releases};
use crate::policy::SchedulingPolicy;
use crate::time::{Duration, Instant, Service};

/// Error type returned when the engine detects a broken invariant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// A job was asked to execute for longer than its remaining time.
    #[error("job {job} over-executed by {by} time units")]
    OverExecution { job: JobId, by: Service },
    /// Active jobs remain, but the policy selected none of them and no
    /// further arrivals are pending.
    #[error("{active} active jobs but nothing selected at t = {at}")]
    Stalled { at: Instant, active: usize },
    /// The policy selected an index outside the active jobs.
    #[error("policy selected job {index} of only {active} active jobs at t = {at}")]
    InvalidSelection {
        at: Instant,
        index: usize,
        active: usize,
    },
}

/// A maximal interval during which one job occupied the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub job: JobId,
    pub start: Instant,
    pub end: Instant,
}

impl Segment {
    pub fn len(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// What happened in one iteration of the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The processor was idle until the given arrival time.
    Idle { until: Instant },
    /// A job executed for `slice` time units, possibly completing.
    Executed {
        job: JobId,
        slice: Duration,
        completed: bool,
    },
    /// All jobs have completed.
    Finished,
}

/// Everything the engine produced by the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// All jobs, in order of completion.
    pub completed: Vec<Job>,
    /// The number of times a job was displaced before completing.
    pub preemptions: usize,
    /// The execution trace, in time order.
    pub schedule: Vec<Segment>,
    /// The time at which the last job completed.
    pub makespan: Instant,
}

/// The uniprocessor event loop, parametric in the scheduling policy.
pub struct Simulator<P: SchedulingPolicy> {
    policy: P,
    now: Instant,
    pending: BTreeMap<Instant, Vec<Job>>,
    released: usize,
    active: Vec<Job>,
    completed: Vec<Job>,
    preemptions: usize,
    schedule: Vec<Segment>,
}

impl<P: SchedulingPolicy> Simulator<P> {
    /// Set up a simulation of the given releases, starting at time zero.
    pub fn new(policy: P, releases: Releases) -> Self {
        let pending = releases.into_pending();
        let released: usize = pending.values().map(Vec::len).sum();
        Simulator {
            policy,
            now: 0,
            pending,
            released,
            active: Vec::new(),
            completed: Vec::with_capacity(released),
            preemptions: 0,
            schedule: Vec::new(),
        }
    }

    /// The current simulated time.
    pub fn now(&self) -> Instant {
        self.now
    }

    /// The jobs that have arrived but not yet completed.
    pub fn active(&self) -> &[Job] {
        &self.active
    }

    /// The jobs that have completed so far, in order of completion.
    pub fn completed(&self) -> &[Job] {
        &self.completed
    }

    /// The job currently holding the processor, if any.
    pub fn executing(&self) -> Option<&Job> {
        self.active.iter().find(|j| j.is_executing())
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_empty() && self.active.is_empty()
    }

    fn next_arrival(&self) -> Option<Instant> {
        self.pending.keys().next().copied()
    }

    /// Move every job released at or before `now` into the active set.
    fn activate_arrivals(&mut self) {
        while let Some(entry) = self.pending.first_entry() {
            if *entry.key() > self.now {
                break;
            }
            let arrivals = entry.remove();
            log::trace!("t={}: {} job(s) released", self.now, arrivals.len());
            self.active.extend(arrivals);
        }
    }

    /// Hand the processor to the active job at index `selected`.
    fn dispatch(&mut self, selected: usize) {
        if self.active[selected].is_executing() {
            return;
        }
        let now = self.now;
        if let Some(prev) = self.active.iter_mut().find(|j| j.is_executing()) {
            prev.set_executing(false, now);
            self.preemptions += 1;
            log::debug!(
                "t={}: {} preempted with {} remaining",
                now,
                prev.id(),
                prev.remaining()
            );
        }
        let next = &mut self.active[selected];
        next.set_executing(true, now);
        log::debug!("t={}: dispatching {}", now, next.id());
    }

    /// Length of the next execution slice of a job with `remaining`
    /// time left: until completion or the next arrival, whichever is
    /// first, but never less than one time unit.
    fn slice_length(&self, remaining: Service) -> Duration {
        match self.next_arrival() {
            Some(arrival) => remaining.min(arrival.saturating_sub(self.now).max(1)),
            None => remaining,
        }
    }

    fn record_segment(&mut self, job: &JobId, start: Instant, end: Instant) {
        match self.schedule.last_mut() {
            Some(last) if &last.job == job && last.end == start => last.end = end,
            _ => self.schedule.push(Segment {
                job: job.clone(),
                start,
                end,
            }),
        }
    }

    /// Carry out one iteration of the event loop.
    pub fn step(&mut self) -> Result<Step, SimulationError> {
        if self.is_finished() {
            return Ok(Step::Finished);
        }

        self.activate_arrivals();

        let selected = match self.policy.select(&self.active) {
            Some(index) => index,
            None => {
                return match self.next_arrival() {
                    Some(until) => {
                        log::trace!("t={}: idle until {}", self.now, until);
                        self.now = until;
                        Ok(Step::Idle { until })
                    }
                    None if self.active.is_empty() => Ok(Step::Finished),
                    None => Err(SimulationError::Stalled {
                        at: self.now,
                        active: self.active.len(),
                    }),
                };
            }
        };

        if selected >= self.active.len() {
            return Err(SimulationError::InvalidSelection {
                at: self.now,
                index: selected,
                active: self.active.len(),
            });
        }

        self.dispatch(selected);

        let start = self.now;
        let slice = self.slice_length(self.active[selected].remaining());
        self.active[selected].execute(slice)?;
        self.now += slice;

        let id = self.active[selected].id().clone();
        log::trace!("t={}..{}: {} executes", start, self.now, id);
        self.record_segment(&id, start, self.now);

        let completed = self.active[selected].remaining() == 0;
        if completed {
            let mut job = self.active.remove(selected);
            job.complete(self.now);
            if job.is_late() {
                log::warn!(
                    "t={}: {} missed its deadline at {}",
                    self.now,
                    job.id(),
                    job.deadline()
                );
            } else {
                log::debug!("t={}: {} completed", self.now, job.id());
            }
            self.completed.push(job);
        }

        Ok(Step::Executed {
            job: id,
            slice,
            completed,
        })
    }

    /// Run the event loop until every released job has completed.
    pub fn run(mut self) -> Result<Outcome, SimulationError> {
        log::info!(
            "simulating {} jobs under {}",
            self.released,
            self.policy.name()
        );
        while self.step()? != Step::Finished {}
        Ok(Outcome {
            makespan: self.now,
            completed: self.completed,
            preemptions: self.preemptions,
            schedule: self.schedule,
        })
    }
}
