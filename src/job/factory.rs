use std::collections::BTreeMap;

use auto_impl::auto_impl;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Job;
use crate::config::ConfigError;
use crate::task::{Task, TaskId, TaskSet};
use crate::time::{Instant, Service};

/// The interface for models that determine the actual execution
/// requirement of each released job.
#[auto_impl(&mut, Box)]
pub trait ExecutionTimeModel {
    /// Check whether the model is applicable to `task` at all.
    fn validate(&self, _task: &Task) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Determine the execution requirement of the next job of `task`.
    fn sample(&mut self, task: &Task) -> Result<Service, ConfigError>;
}

/// Every job executes for exactly its task's WCET.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorstCase;

impl ExecutionTimeModel for WorstCase {
    fn sample(&mut self, task: &Task) -> Result<Service, ConfigError> {
        Ok(task.wcet())
    }
}

/// Execution requirements are drawn uniformly from `[BCET, WCET]` using
/// an explicitly provided random source.
#[derive(Debug, Clone)]
pub struct Uniform<R: Rng> {
    rng: R,
}

impl<R: Rng> Uniform<R> {
    pub fn new(rng: R) -> Self {
        Uniform { rng }
    }
}

impl Uniform<StdRng> {
    /// A reproducible model: the same seed yields the same draws.
    pub fn seeded(seed: u64) -> Self {
        Uniform::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ExecutionTimeModel for Uniform<R> {
    fn validate(&self, task: &Task) -> Result<(), ConfigError> {
        match task.bcet() {
            None => Err(ConfigError::MissingBcet {
                task: task.id().clone(),
            }),
            Some(bcet) if bcet > task.wcet() => Err(ConfigError::BcetExceedsWcet {
                task: task.id().clone(),
                bcet,
                wcet: task.wcet(),
            }),
            Some(_) => Ok(()),
        }
    }

    fn sample(&mut self, task: &Task) -> Result<Service, ConfigError> {
        self.validate(task)?;
        let bcet = task.bcet().unwrap_or_else(|| task.wcet());
        Ok(self.rng.random_range(bcet..=task.wcet()))
    }
}

/// All jobs released within one hyperperiod, indexed by arrival time.
#[derive(Debug, Clone)]
pub struct Releases {
    by_arrival: BTreeMap<Instant, Vec<Job>>,
    per_task: Vec<(TaskId, usize)>,
    hyperperiod: Instant,
}

impl Releases {
    pub fn hyperperiod(&self) -> Instant {
        self.hyperperiod
    }

    /// The distinct arrival times, in ascending order.
    pub fn arrival_times(&self) -> impl Iterator<Item = Instant> + '_ {
        self.by_arrival.keys().copied()
    }

    /// The jobs released at exactly time `t`, in task-set order.
    pub fn released_at(&self, t: Instant) -> &[Job] {
        self.by_arrival
            .get(&t)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterate over all jobs in order of arrival.
    pub fn iter(&self) -> impl Iterator<Item = &Job> + '_ {
        self.by_arrival.values().flatten()
    }

    /// The number of jobs released by each task, in task-set order.
    pub fn release_counts(&self) -> &[(TaskId, usize)] {
        &self.per_task
    }

    pub fn releases_of(&self, task: &TaskId) -> usize {
        self.per_task
            .iter()
            .find(|(id, _)| id == task)
            .map_or(0, |(_, n)| *n)
    }

    /// Total number of jobs.
    pub fn len(&self) -> usize {
        self.per_task.iter().map(|(_, n)| n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn into_pending(self) -> BTreeMap<Instant, Vec<Job>> {
        self.by_arrival
    }
}

/// Expands every task of a task set into its releases within one
/// hyperperiod.
#[derive(Debug, Clone)]
pub struct JobFactory<M: ExecutionTimeModel> {
    model: M,
}

impl JobFactory<WorstCase> {
    pub fn worst_case() -> Self {
        JobFactory::new(WorstCase)
    }
}

impl<M: ExecutionTimeModel> JobFactory<M> {
    pub fn new(model: M) -> Self {
        JobFactory { model }
    }

    /// Create the jobs of every task for every `k` in
    /// `[0, hyperperiod / T)`, each released at `k * T`.
    ///
    /// The execution-time model is validated against all tasks before
    /// any job is created.
    pub fn release_jobs(&mut self, tasks: &TaskSet) -> Result<Releases, ConfigError> {
        for task in tasks {
            self.model.validate(task)?;
        }

        let hyperperiod = tasks.hyperperiod();
        let mut by_arrival: BTreeMap<Instant, Vec<Job>> = BTreeMap::new();
        let mut per_task = Vec::with_capacity(tasks.len());

        for task in tasks {
            let n = hyperperiod / task.period();
            for k in 0..n {
                let arrival = k * task.period();
                let cost = self.model.sample(task)?;
                by_arrival
                    .entry(arrival)
                    .or_default()
                    .push(Job::new(task, arrival, cost));
            }
            per_task.push((task.id().clone(), n as usize));
        }

        log::debug!(
            "released {} jobs at {} distinct arrival times within hyperperiod {}",
            per_task.iter().map(|(_, n)| n).sum::<usize>(),
            by_arrival.len(),
            hyperperiod
        );

        Ok(Releases {
            by_arrival,
            per_task,
            hyperperiod,
        })
    }
}
