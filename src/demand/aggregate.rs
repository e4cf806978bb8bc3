use itertools::Itertools;

use super::DemandBound;
use crate::time::{Duration, Service};

/// A wrapper type for representing the total demand of a vector of
/// individual demand sources (e.g., all tasks of a task set).
#[derive(Clone, Debug)]
pub struct Aggregate<T> {
    individual: Vec<T>,
}

impl<T> Aggregate<T> {
    pub fn new(components: Vec<T>) -> Self {
        Aggregate {
            individual: components,
        }
    }
}

impl<T: DemandBound> DemandBound for Aggregate<T> {
    fn demand(&self, t: Duration) -> Service {
        self.individual.iter().map(|dbf| dbf.demand(t)).sum()
    }

    fn steps_iter<'a>(&'a self) -> Box<dyn Iterator<Item = Duration> + 'a> {
        Box::new(
            self.individual
                .iter()
                .map(|dbf| dbf.steps_iter())
                .kmerge()
                .dedup(),
        )
    }
}
