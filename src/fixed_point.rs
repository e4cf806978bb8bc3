use crate::time::{Duration, Service};

use thiserror::Error;

/// Error type returned when a fixed point search fails.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq, PartialOrd)]
pub enum SearchFailure {
    /// No fixed point found below the given divergence threshold.
    #[error("no fixed point less than or equal to {limit} found")]
    DivergenceLimitExceeded { limit: Duration },
}

pub type SearchResult = Result<Duration, SearchFailure>;

/// Iterative search for the least fixed point `R = workload(R)` up to
/// a given `divergence_limit`, assuming a dedicated processor (i.e.,
/// `demand` units of service take exactly `demand` time units).
pub fn search<RHS>(divergence_limit: Duration, workload: RHS) -> SearchResult
where
    RHS: Fn(Duration) -> Service,
{
    let bound = search_iteratively(divergence_limit, &workload);
    // In debug mode, compare against the brute-force solution.
    #[cfg(debug_assertions)]
    debug_assert_eq!(brute_force_search(divergence_limit, &workload), bound);
    bound
}

fn search_iteratively<RHS>(divergence_limit: Duration, workload: &RHS) -> SearchResult
where
    RHS: Fn(Duration) -> Service,
{
    let mut assumed_response_time = 1;
    while assumed_response_time <= divergence_limit {
        let response_time_bound = workload(assumed_response_time);
        if response_time_bound <= assumed_response_time {
            // we have converged
            return Ok(response_time_bound);
        } else {
            // continue iterating
            assumed_response_time = response_time_bound
        }
    }
    // if we get here, we failed to converge => no solution
    Err(SearchFailure::DivergenceLimitExceeded {
        limit: divergence_limit,
    })
}

/// Very slow, naive search for a fixed point up to the given
/// `divergence_limit`. Do not use --- use [search] instead.
#[cfg(debug_assertions)]
fn brute_force_search<RHS>(divergence_limit: Duration, workload: &RHS) -> SearchResult
where
    RHS: Fn(Duration) -> Service,
{
    for r in 1..=divergence_limit {
        let rhs = workload(r);
        // corner case: zero demand is trivially satisfied immediately
        if rhs == 0 {
            return Ok(0);
        } else if rhs == r {
            return Ok(r);
        }
    }
    Err(SearchFailure::DivergenceLimitExceeded {
        limit: divergence_limit,
    })
}
