/*! Simulation configuration

The only knob of a simulation run is how the execution requirement of
each job is determined: either every job takes its task's WCET, or
execution times are drawn from `[BCET, WCET]` with a seeded random
source so that runs remain reproducible.
*/

use thiserror::Error;

use crate::job::{ExecutionTimeModel, Uniform, WorstCase};
use crate::task::TaskId;
use crate::time::Service;

/// Error type returned when a configuration cannot be applied to a
/// task set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("randomized execution times require a BCET for task {task}")]
    MissingBcet { task: TaskId },
    #[error("task {task}: BCET {bcet} exceeds WCET {wcet}")]
    BcetExceedsWcet {
        task: TaskId,
        bcet: Service,
        wcet: Service,
    },
}

/// How the execution requirement of each job is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionTimeMode {
    /// Every job executes for its task's WCET.
    #[default]
    WorstCase,
    /// Every job executes for a uniformly drawn time in `[BCET, WCET]`.
    Randomized { seed: u64 },
}

impl ExecutionTimeMode {
    /// Instantiate the corresponding execution-time model.
    pub fn model(&self) -> Box<dyn ExecutionTimeModel> {
        match *self {
            ExecutionTimeMode::WorstCase => Box::new(WorstCase),
            ExecutionTimeMode::Randomized { seed } => Box::new(Uniform::seeded(seed)),
        }
    }
}

/// Parameters of a single simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimulationConfig {
    pub execution_time: ExecutionTimeMode,
}

impl SimulationConfig {
    pub fn worst_case() -> Self {
        SimulationConfig {
            execution_time: ExecutionTimeMode::WorstCase,
        }
    }

    pub fn randomized(seed: u64) -> Self {
        SimulationConfig {
            execution_time: ExecutionTimeMode::Randomized { seed },
        }
    }
}
