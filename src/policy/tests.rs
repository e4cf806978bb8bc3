use assert_approx_eq::assert_approx_eq;

use crate::job::Job;
use crate::policy::{Edf, RateMonotonic, RmTest, SchedulingPolicy};
use crate::task::TaskSet;
use crate::tests::{task, task_set};
use crate::time::{Duration, Instant};

fn job(id: &str, period: Duration, deadline: Duration, arrival: Instant) -> Job {
    let t = task(id, period, deadline, 1);
    Job::new(&t, arrival, t.wcet())
}

fn running(mut j: Job, now: Instant) -> Job {
    j.set_executing(true, now);
    j
}

fn selected<P: SchedulingPolicy>(policy: P, active: &[Job]) -> Option<String> {
    policy.select(active).map(|i| active[i].id().to_string())
}

#[test]
fn nothing_to_select() {
    assert_eq!(Edf.select(&[]), None);
    assert_eq!(RateMonotonic::new().select(&[]), None);
}

#[test]
fn edf_prefers_earliest_deadline() {
    let active = vec![job("A", 10, 10, 0), job("B", 20, 7, 0), job("C", 5, 5, 5)];
    assert_eq!(selected(Edf, &active), Some("B_0".to_string()));
}

#[test]
fn edf_keeps_executing_job_on_ties() {
    // both deadlines at 10
    let active = vec![job("A", 5, 5, 5), running(job("B", 10, 10, 0), 0)];
    assert_eq!(selected(Edf, &active), Some("B_0".to_string()));

    let active = vec![job("A", 5, 5, 5), job("B", 10, 10, 0)];
    assert_eq!(selected(Edf, &active), Some("A_5".to_string()));
}

#[test]
fn edf_breaks_remaining_ties_by_id() {
    let active = vec![job("B", 4, 4, 0), job("A", 4, 4, 0)];
    assert_eq!(selected(Edf, &active), Some("A_0".to_string()));
}

#[test]
fn rm_prefers_shortest_period() {
    // the deadline plays no role
    let active = vec![job("A", 10, 2, 0), job("B", 5, 5, 0)];
    assert_eq!(
        selected(RateMonotonic::new(), &active),
        Some("B_0".to_string())
    );

    // nor does the executing flag
    let active = vec![running(job("A", 10, 10, 0), 0), job("B", 5, 5, 5)];
    assert_eq!(
        selected(RateMonotonic::new(), &active),
        Some("B_5".to_string())
    );
}

#[test]
fn rm_ties() {
    let active = vec![job("B", 5, 5, 0), job("A", 5, 5, 0)];
    assert_eq!(
        selected(RateMonotonic::new(), &active),
        Some("A_0".to_string())
    );

    // a backlogged job goes before the next one of the same task
    let active = vec![job("A", 5, 5, 5), job("A", 5, 5, 0)];
    assert_eq!(
        selected(RateMonotonic::new(), &active),
        Some("A_0".to_string())
    );
}

#[test]
fn liu_layland_bound() {
    assert_approx_eq!(RateMonotonic::liu_layland_bound(0), 1.0);
    assert_approx_eq!(RateMonotonic::liu_layland_bound(1), 1.0);
    assert_approx_eq!(RateMonotonic::liu_layland_bound(2), 0.8284, 0.0001);
    assert_approx_eq!(RateMonotonic::liu_layland_bound(3), 0.7798, 0.0001);
    // approaches ln 2
    assert_approx_eq!(RateMonotonic::liu_layland_bound(1000), 0.6934, 0.0001);

    let rm = RateMonotonic::new();
    assert_approx_eq!(rm.least_upper_bound(2), RateMonotonic::liu_layland_bound(2));
    assert_approx_eq!(Edf.least_upper_bound(2), 1.0);
    assert_approx_eq!(Edf.least_upper_bound(0), 1.0);
}

#[test]
fn hyperbolic_dominates_liu_layland() {
    let ts = task_set(&[("A", 4, 4, 3), ("B", 8, 8, 1)]);
    assert!(!RateMonotonic::liu_layland_test(&ts));
    assert!(RateMonotonic::hyperbolic_test(&ts));

    assert!(!RateMonotonic::new().is_schedulable(&ts));
    assert!(RateMonotonic::with_test(RmTest::Hyperbolic).is_schedulable(&ts));
    assert!(RateMonotonic::with_test(RmTest::ResponseTime).is_schedulable(&ts));
}

#[test]
fn response_time_analysis_is_exact() {
    // harmonic periods at full utilization
    let ts = task_set(&[("A", 2, 2, 1), ("B", 4, 4, 2)]);
    assert!(!RateMonotonic::hyperbolic_test(&ts));
    assert!(!RateMonotonic::liu_layland_test(&ts));
    assert!(RateMonotonic::with_test(RmTest::ResponseTime).is_schedulable(&ts));
    assert_eq!(RateMonotonic::new().test(), RmTest::LiuLayland);
}

#[test]
fn edf_implicit_deadlines() {
    assert!(Edf.is_schedulable(&task_set(&[("A", 2, 2, 1), ("B", 4, 4, 2)])));
    assert!(!Edf.is_schedulable(&task_set(&[("A", 2, 2, 1), ("B", 4, 4, 3)])));
    // exact at U = 1 despite 1/3 having no finite binary representation
    assert!(Edf.is_schedulable(&task_set(&[
        ("A", 3, 3, 1),
        ("B", 3, 3, 1),
        ("C", 3, 3, 1)
    ])));
}

#[test]
fn edf_constrained_deadlines() {
    // U = 0.75, but both jobs are due at t = 2
    let ts = task_set(&[("A", 4, 2, 2), ("B", 4, 2, 1)]);
    assert!(!Edf.is_schedulable(&ts));

    let ts = task_set(&[("A", 4, 2, 1), ("B", 4, 3, 2)]);
    assert!(Edf.is_schedulable(&ts));
}

#[test]
fn analyze_bundles_verdict() {
    let ts = task_set(&[("A", 4, 4, 1), ("B", 5, 5, 3)]);

    let edf = Edf.analyze(&ts);
    assert!(edf.schedulable);
    assert_approx_eq!(edf.utilization, 0.85);
    assert_approx_eq!(edf.least_upper_bound, 1.0);

    let rm = RateMonotonic::new().analyze(&ts);
    assert!(!rm.schedulable);
    assert_approx_eq!(rm.utilization, 0.85);
    assert_approx_eq!(rm.least_upper_bound, 0.8284, 0.0001);

    let empty = RateMonotonic::new().analyze(&TaskSet::empty());
    assert!(empty.schedulable);
    assert_eq!(empty.utilization, 0.0);
}

#[test]
fn bound_is_liu_layland_for_every_rm_test() {
    // U = 0.875 exceeds the two-task bound, yet two of the tests accept
    let ts = task_set(&[("A", 4, 4, 3), ("B", 8, 8, 1)]);
    for (test, schedulable) in [
        (RmTest::LiuLayland, false),
        (RmTest::Hyperbolic, true),
        (RmTest::ResponseTime, true),
    ] {
        let verdict = RateMonotonic::with_test(test).analyze(&ts);
        assert_eq!(verdict.schedulable, schedulable);
        assert_approx_eq!(verdict.least_upper_bound, 0.8284, 0.0001);
        assert_approx_eq!(verdict.utilization, 0.875);
    }
}

#[test]
fn rta_accepts_deadlines_beyond_the_period() {
    let ts = task_set(&[("A", 4, 4, 2), ("B", 6, 12, 3)]);
    assert!(RateMonotonic::with_test(RmTest::ResponseTime).is_schedulable(&ts));
}

#[test]
fn policies_behind_references() {
    let policies: Vec<Box<dyn SchedulingPolicy>> =
        vec![Box::new(Edf), Box::new(RateMonotonic::new())];
    let names: Vec<_> = policies.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["EDF", "RM"]);

    let active = vec![job("A", 10, 3, 0), job("B", 5, 5, 0)];
    let by_ref = &Edf;
    assert_eq!(selected(by_ref, &active), Some("A_0".to_string()));
}
