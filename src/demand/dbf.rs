use super::DemandBound;
use crate::task::Task;
use crate::time::{Duration, Service};

/// The DBF of a single periodic task with an arbitrary deadline.
impl DemandBound for Task {
    fn demand(&self, t: Duration) -> Service {
        if t < self.deadline() {
            0
        } else {
            ((t - self.deadline()) / self.period() + 1).saturating_mul(self.wcet())
        }
    }

    fn steps_iter<'a>(&'a self) -> Box<dyn Iterator<Item = Duration> + 'a> {
        // ends where `D + k * T` is no longer representable
        Box::new((0..).map_while(move |k: u64| {
            k.checked_mul(self.period())?.checked_add(self.deadline())
        }))
    }
}
