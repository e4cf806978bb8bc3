/*! Periodic task descriptors and task sets

A [Task] is the classic Liu & Layland periodic task, extended with a
relative deadline and an optional best-case execution time. A
[TaskSet] is an ordered, validated collection of tasks with unique ids.
*/

use std::fmt;

use derive_more::{Display, From};
use thiserror::Error;

use crate::time::{self, Duration, Instant, Lateness, Service, Time};

/// The unique key identifying a task within a task set.
#[derive(Debug, Display, From, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(String);

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        TaskId(id.to_string())
    }
}

/// Error type returned when task parameters are malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("task {task} has a zero period")]
    ZeroPeriod { task: TaskId },
    #[error("task {task} has a zero relative deadline")]
    ZeroDeadline { task: TaskId },
    #[error("task {task} has a zero WCET")]
    ZeroWcet { task: TaskId },
    #[error("task {task}: BCET {bcet} must lie in [1, {wcet}]")]
    InvalidBcet {
        task: TaskId,
        bcet: Service,
        wcet: Service,
    },
    #[error("task id {task} occurs more than once")]
    DuplicateId { task: TaskId },
    #[error("the hyperperiod of the task set overflows")]
    HyperperiodOverflow,
    /// The hyperperiod plus the largest deadline and the total demand
    /// of one hyperperiod must fit into a signed 64-bit time value, so
    /// that every deadline, completion and lateness is representable.
    #[error("the simulation horizon of the task set exceeds {max}")]
    HorizonOverflow { max: Time },
}

/// A periodic task with a constrained or arbitrary relative deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    period: Duration,
    deadline: Duration,
    wcet: Service,
    bcet: Option<Service>,
}

impl Task {
    /// Construct a new task. Period, deadline and WCET must all be
    /// strictly positive.
    pub fn new(
        id: impl Into<TaskId>,
        period: Duration,
        deadline: Duration,
        wcet: Service,
    ) -> Result<Task, TaskError> {
        let id = id.into();
        if period == 0 {
            return Err(TaskError::ZeroPeriod { task: id });
        }
        if deadline == 0 {
            return Err(TaskError::ZeroDeadline { task: id });
        }
        if wcet == 0 {
            return Err(TaskError::ZeroWcet { task: id });
        }
        Ok(Task {
            id,
            period,
            deadline,
            wcet,
            bcet: None,
        })
    }

    /// Construct a task whose deadline equals its period.
    pub fn implicit(
        id: impl Into<TaskId>,
        period: Duration,
        wcet: Service,
    ) -> Result<Task, TaskError> {
        Task::new(id, period, period, wcet)
    }

    /// Attach a best-case execution time, which must satisfy
    /// `0 < bcet <= wcet`.
    pub fn with_bcet(mut self, bcet: Service) -> Result<Task, TaskError> {
        if bcet == 0 || bcet > self.wcet {
            return Err(TaskError::InvalidBcet {
                task: self.id,
                bcet,
                wcet: self.wcet,
            });
        }
        self.bcet = Some(bcet);
        Ok(self)
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn wcet(&self) -> Service {
        self.wcet
    }

    pub fn bcet(&self) -> Option<Service> {
        self.bcet
    }

    /// The fraction of the processor demanded by the task, `C/T`.
    pub fn utilization(&self) -> f64 {
        self.wcet as f64 / self.period as f64
    }

    pub fn has_implicit_deadline(&self) -> bool {
        self.deadline == self.period
    }

    /// Bound the number of jobs released in any interval of length `delta`.
    pub fn number_arrivals(&self, delta: Duration) -> u64 {
        time::divide_with_ceil(delta, self.period)
    }

    /// Bound the total amount of service requested by jobs released in
    /// any interval of length `delta`.
    pub fn service_needed(&self, delta: Duration) -> Service {
        self.number_arrivals(delta).saturating_mul(self.wcet)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(T={}, D={}, C={})",
            self.id, self.period, self.deadline, self.wcet
        )
    }
}

/// An ordered collection of tasks with unique ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSet {
    tasks: Vec<Task>,
    hyperperiod: Time,
}

impl TaskSet {
    /// Validate the given tasks and compute the hyperperiod.
    pub fn new(tasks: Vec<Task>) -> Result<TaskSet, TaskError> {
        for (i, task) in tasks.iter().enumerate() {
            if tasks[..i].iter().any(|other| other.id == task.id) {
                return Err(TaskError::DuplicateId {
                    task: task.id.clone(),
                });
            }
        }
        let hyperperiod = tasks
            .iter()
            .try_fold(1, |h, task| time::checked_lcm(h, task.period))
            .ok_or(TaskError::HyperperiodOverflow)?;
        check_horizon(&tasks, hyperperiod)?;
        Ok(TaskSet { tasks, hyperperiod })
    }

    /// The empty task set, with a neutral hyperperiod of one.
    pub fn empty() -> TaskSet {
        TaskSet {
            tasks: Vec::new(),
            hyperperiod: 1,
        }
    }

    /// The least common multiple of all task periods.
    pub fn hyperperiod(&self) -> Instant {
        self.hyperperiod
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Total utilization `Σ C_i/T_i`.
    pub fn utilization(&self) -> f64 {
        self.tasks.iter().map(Task::utilization).sum()
    }

    /// Exact check of `Σ C_i/T_i <= 1`, carried out in integer
    /// arithmetic by scaling every term to the hyperperiod.
    pub fn utilization_at_most_one(&self) -> bool {
        let h = self.hyperperiod as u128;
        let scaled: u128 = self
            .tasks
            .iter()
            .map(|t| t.wcet as u128 * (h / t.period as u128))
            .sum();
        scaled <= h
    }

    /// Do all tasks have implicit deadlines (`D_i == T_i`)?
    pub fn has_implicit_deadlines(&self) -> bool {
        self.tasks.iter().all(Task::has_implicit_deadline)
    }
}

/// The latest instant the simulation of one hyperperiod can reach is
/// bounded by `H + Σ (H/T_i) C_i`, and no deadline lies beyond
/// `H + max D_i`.
fn check_horizon(tasks: &[Task], hyperperiod: Time) -> Result<(), TaskError> {
    let max = Lateness::MAX as Time;
    let max_deadline = tasks.iter().map(|t| t.deadline).max().unwrap_or(0);
    let demand = tasks.iter().try_fold(0, |acc: Time, t| {
        (hyperperiod / t.period).checked_mul(t.wcet)?.checked_add(acc)
    });
    let horizon = demand.and_then(|d| d.checked_add(hyperperiod)?.checked_add(max_deadline));
    match horizon {
        Some(h) if h <= max => Ok(()),
        _ => Err(TaskError::HorizonOverflow { max }),
    }
}

impl<'a> IntoIterator for &'a TaskSet {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
