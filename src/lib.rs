/*! Simulation and schedulability analysis of periodic real-time task sets

This crate simulates fully preemptive scheduling of a set of periodic
tasks on a single, dedicated processor over one hyperperiod, and
compares the observed behavior with analytic schedulability tests.

Two scheduling policies are provided in [policy]: earliest-deadline
first ([policy::Edf]) and rate-monotonic ([policy::RateMonotonic])
scheduling. Each comes with the analytic tests commonly associated with
it, such as the utilization bound of Liu & Layland, the hyperbolic
bound, response-time analysis ([fixed_priority]) and the exact
processor-demand criterion for EDF ([demand]).

The main entry point is [simulate], which

1. expands the task set into individual jobs ([job::JobFactory]),
2. runs the discrete-event engine ([sim::Simulator]),
3. applies the policy's analytic test, and
4. reduces everything into an immutable [metrics::SimulationResult].

```
use periodic_sched_sim::{simulate, SimulationConfig};
use periodic_sched_sim::policy::Edf;
use periodic_sched_sim::task::{Task, TaskSet};

let tasks = TaskSet::new(vec![
    Task::implicit("A", 4, 1).unwrap(),
    Task::implicit("B", 5, 3).unwrap(),
])
.unwrap();
let result = simulate(&tasks, Edf, &SimulationConfig::default()).unwrap();
assert_eq!(result.hyperperiod(), 20);
assert!(result.simulated().schedulable);
```

The library emits diagnostics through the [log] facade; installing a
logger is up to the application.
*/

use thiserror::Error;

pub mod config;
pub mod demand;
pub mod fixed_point;
pub mod fixed_priority;
pub mod job;
pub mod metrics;
pub mod policy;
pub mod sim;
pub mod task;
pub mod time;

pub use config::{ConfigError, ExecutionTimeMode, SimulationConfig};
pub use metrics::SimulationResult;
pub use sim::SimulationError;
pub use task::{Task, TaskError, TaskId, TaskSet};

use job::{ExecutionTimeModel, JobFactory};
use metrics::Metrics;
use policy::SchedulingPolicy;
use sim::Simulator;

/// Any error that can occur while setting up or running a simulation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

/// Simulate `tasks` under `policy` for one hyperperiod, with execution
/// times chosen according to `config`, and report the outcome together
/// with the policy's analytic verdict.
pub fn simulate<P: SchedulingPolicy>(
    tasks: &TaskSet,
    policy: P,
    config: &SimulationConfig,
) -> Result<SimulationResult, Error> {
    simulate_with_model(tasks, policy, config.execution_time.model())
}

/// Like [simulate], but with an explicitly provided execution-time
/// model (e.g., a [job::Uniform] model around a custom random source).
pub fn simulate_with_model<P, M>(
    tasks: &TaskSet,
    policy: P,
    model: M,
) -> Result<SimulationResult, Error>
where
    P: SchedulingPolicy,
    M: ExecutionTimeModel,
{
    let releases = JobFactory::new(model).release_jobs(tasks)?;
    let analytic = policy.analyze(tasks);
    let name = policy.name();

    log::info!(
        "{}: {} tasks, hyperperiod {}, utilization {:.3}",
        name,
        tasks.len(),
        tasks.hyperperiod(),
        analytic.utilization
    );

    let outcome = Simulator::new(policy, releases).run()?;
    let result = Metrics::aggregate(name, tasks, outcome, analytic);

    log::info!(
        "{}: {} jobs completed, {} late, max lateness {}",
        name,
        result.completed_jobs().len(),
        result.late_jobs(),
        result.max_lateness()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use crate::job::{self, Uniform};
    use crate::policy::{Edf, RateMonotonic, RmTest};
    use crate::time::{Duration, Service};
    use crate::{
        simulate, simulate_with_model, ConfigError, Error, SimulationConfig, Task, TaskError,
        TaskSet,
    };
    use assert_approx_eq::assert_approx_eq;

    pub fn task(id: &str, period: Duration, deadline: Duration, wcet: Service) -> Task {
        Task::new(id, period, deadline, wcet).unwrap()
    }

    pub fn task_set(params: &[(&str, Duration, Duration, Service)]) -> TaskSet {
        TaskSet::new(
            params
                .iter()
                .map(|(id, period, deadline, wcet)| task(id, *period, *deadline, *wcet))
                .collect(),
        )
        .unwrap()
    }

    fn ids_and_values<T: Copy>(trace: &[(job::JobId, T)]) -> Vec<(String, T)> {
        trace.iter().map(|(id, v)| (id.to_string(), *v)).collect()
    }

    fn pairs<T: Copy>(expected: &[(&str, T)]) -> Vec<(String, T)> {
        expected.iter().map(|(id, v)| (id.to_string(), *v)).collect()
    }

    #[test]
    fn edf_example_1() {
        let ts = task_set(&[("A", 4, 4, 1), ("B", 5, 5, 3)]);
        let result = simulate(&ts, Edf, &SimulationConfig::default()).unwrap();

        let a = result.task(&"A".into()).unwrap();
        let b = result.task(&"B".into()).unwrap();
        assert_eq!(
            ids_and_values(a.response_times()),
            pairs(&[("A_0", 1), ("A_4", 1), ("A_8", 1), ("A_12", 2), ("A_16", 3)])
        );
        assert_eq!(
            ids_and_values(b.response_times()),
            pairs(&[("B_0", 4), ("B_5", 3), ("B_10", 3), ("B_15", 3)])
        );
        assert_eq!(
            ids_and_values(a.activation_times()),
            pairs(&[("A_0", 0), ("A_4", 4), ("A_8", 8), ("A_12", 12), ("A_16", 16)])
        );
        assert_eq!(
            ids_and_values(b.completion_times()),
            pairs(&[("B_0", 4), ("B_5", 8), ("B_10", 13), ("B_15", 18)])
        );
        assert_eq!(result.hyperperiod(), 20);
        assert!(result.simulated().schedulable);
        assert!(result.analytic().schedulable);
        assert!(result.verdicts_agree());
        assert_approx_eq!(result.analytic().utilization, 0.85);
        assert_approx_eq!(result.analytic().least_upper_bound, 1.0);
    }

    #[test]
    fn edf_example_2() {
        let ts = task_set(&[("A", 4, 4, 1), ("B", 5, 5, 4)]);
        let result = simulate(&ts, Edf, &SimulationConfig::default()).unwrap();

        let a = result.task(&"A".into()).unwrap();
        let b = result.task(&"B".into()).unwrap();
        assert_eq!(
            ids_and_values(a.response_times()),
            pairs(&[("A_0", 1), ("A_4", 2), ("A_8", 3), ("A_12", 4), ("A_16", 1)])
        );
        assert_eq!(
            ids_and_values(b.response_times()),
            pairs(&[("B_0", 5), ("B_5", 5), ("B_10", 5), ("B_15", 6)])
        );
        assert_eq!(result.hyperperiod(), 20);
        assert!(!result.simulated().schedulable);
        assert_eq!(result.late_jobs(), 1);
        assert_eq!(result.max_lateness(), 1);
        assert!(!result.analytic().schedulable);
        assert_approx_eq!(result.analytic().utilization, 1.05);
    }

    #[test]
    fn rm_example() {
        let ts = task_set(&[("A", 4, 4, 1), ("B", 5, 5, 3)]);
        let result = simulate(&ts, RateMonotonic::new(), &SimulationConfig::default()).unwrap();

        let b = result.task(&"B".into()).unwrap();
        assert_eq!(
            ids_and_values(b.response_times()),
            pairs(&[("B_0", 4), ("B_5", 3), ("B_10", 4), ("B_15", 4)])
        );
        assert_eq!(result.late_jobs(), 0);
        assert_eq!(result.max_lateness(), -1);
        // U = 0.85 exceeds the Liu & Layland bound for two tasks ...
        assert!(!result.analytic().schedulable);
        assert_approx_eq!(result.analytic().least_upper_bound, 0.8284, 0.0001);
        // ... so the simulation and the default test disagree
        assert!(!result.verdicts_agree());

        let exact = simulate(
            &ts,
            RateMonotonic::with_test(RmTest::ResponseTime),
            &SimulationConfig::default(),
        )
        .unwrap();
        assert!(exact.analytic().schedulable);
        assert!(exact.verdicts_agree());
    }

    #[test]
    fn rm_deadline_beyond_period() {
        let ts = task_set(&[("A", 4, 4, 2), ("B", 6, 12, 3)]);
        let result = simulate(
            &ts,
            RateMonotonic::with_test(RmTest::ResponseTime),
            &SimulationConfig::default(),
        )
        .unwrap();

        let b = result.task(&"B".into()).unwrap();
        assert_eq!(
            ids_and_values(b.response_times()),
            pairs(&[("B_0", 7), ("B_6", 6)])
        );
        assert_eq!(result.late_jobs(), 0);
        assert!(result.analytic().schedulable);
        assert!(result.verdicts_agree());
    }

    #[test]
    fn unrepresentable_horizon_is_rejected() {
        let ts = TaskSet::new(vec![
            task("A", 2, u64::MAX, 1),
            task("B", 3, 3, 1),
        ]);
        assert!(matches!(ts, Err(TaskError::HorizonOverflow { .. })));
        let ts = TaskSet::new(vec![task("A", u64::MAX, 5, 1)]);
        assert!(matches!(ts, Err(TaskError::HorizonOverflow { .. })));
    }

    #[test]
    fn release_counts_and_hyperperiod() {
        let ts = task_set(&[("A", 3, 3, 1), ("B", 4, 4, 1), ("C", 6, 6, 1)]);
        let result = simulate(&ts, Edf, &SimulationConfig::default()).unwrap();
        assert_eq!(result.hyperperiod(), 12);
        let releases: Vec<_> = result.per_task().iter().map(|m| m.releases()).collect();
        assert_eq!(releases, vec![4, 3, 2]);
        assert_eq!(result.completed_jobs().len(), 9);
    }

    #[test]
    fn deterministic_runs_are_identical() {
        let ts = task_set(&[("A", 5, 4, 2), ("B", 7, 7, 2), ("C", 10, 10, 1)]);
        let config = SimulationConfig::worst_case();
        assert_eq!(
            simulate(&ts, Edf, &config).unwrap(),
            simulate(&ts, Edf, &config).unwrap()
        );
        let seeded = SimulationConfig::randomized(7);
        let ts = TaskSet::new(
            ts.iter()
                .map(|t| t.clone().with_bcet(1).unwrap())
                .collect(),
        )
        .unwrap();
        assert_eq!(
            simulate(&ts, RateMonotonic::new(), &seeded).unwrap(),
            simulate(&ts, RateMonotonic::new(), &seeded).unwrap()
        );
    }

    #[test]
    fn overload_is_always_detected() {
        let ts = task_set(&[("A", 2, 2, 1), ("B", 3, 3, 1), ("C", 6, 6, 2)]);
        for result in [
            simulate(&ts, Edf, &SimulationConfig::default()).unwrap(),
            simulate(&ts, RateMonotonic::new(), &SimulationConfig::default()).unwrap(),
        ] {
            assert!(!result.simulated().schedulable);
            assert!(!result.analytic().schedulable);
        }
    }

    #[test]
    fn empty_task_set() {
        let result = simulate(&TaskSet::empty(), Edf, &SimulationConfig::default()).unwrap();
        assert_eq!(result.hyperperiod(), 1);
        assert!(result.completed_jobs().is_empty());
        assert!(result.per_task().is_empty());
        assert!(result.simulated().schedulable);
        assert!(result.analytic().schedulable);
        assert_eq!(result.average_response_time(), 0.0);
        assert_eq!(result.max_lateness(), 0);

        let rm = simulate(&TaskSet::empty(), RateMonotonic::new(), &SimulationConfig::default())
            .unwrap();
        assert!(rm.analytic().schedulable);
    }

    #[test]
    fn randomized_mode_requires_bcet() {
        let ts = task_set(&[("A", 4, 4, 1)]);
        assert_eq!(
            simulate(&ts, Edf, &SimulationConfig::randomized(1)),
            Err(Error::Config(ConfigError::MissingBcet { task: "A".into() }))
        );
    }

    #[test]
    fn randomized_execution_times_stay_within_bounds() {
        let ts = TaskSet::new(vec![
            task("A", 4, 4, 3).with_bcet(1).unwrap(),
            task("B", 6, 6, 2).with_bcet(2).unwrap(),
        ])
        .unwrap();
        let result =
            simulate_with_model(&ts, Edf, Uniform::seeded(42)).unwrap();
        for job in result.completed_jobs() {
            let t = ts.get(job.task_id()).unwrap();
            assert!(job.cost() >= t.bcet().unwrap());
            assert!(job.cost() <= t.wcet());
        }
    }
}
