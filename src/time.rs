/// This crate uses a simple discrete time model.
pub type Time = u64;

/// Syntactic sugar to give a hint that a time value indicates a
/// point in time.
pub type Instant = Time;

/// Syntactic sugar to give a hint that a time value denotes an
/// interval length.
pub type Duration = Time;

/// Syntactic sugar to give a hint that a time value represents some
/// amount of processor service.
pub type Service = Time;

/// The signed distance between a completion and a deadline. Negative
/// values mean the job finished early.
pub type Lateness = i64;

/// Integer division rounding towards positive infinity.
pub(crate) fn divide_with_ceil(a: Time, b: Time) -> Time {
    a / b + (a % b > 0) as Time
}

pub(crate) fn gcd(mut a: Time, mut b: Time) -> Time {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Least common multiple, or `None` on overflow.
pub(crate) fn checked_lcm(a: Time, b: Time) -> Option<Time> {
    (a / gcd(a, b)).checked_mul(b)
}

/// Signed difference `a - b` of two instants, saturating at the bounds
/// of [Lateness].
pub(crate) fn signed_diff(a: Instant, b: Instant) -> Lateness {
    let diff = a as i128 - b as i128;
    diff.clamp(Lateness::MIN as i128, Lateness::MAX as i128) as Lateness
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_diff_saturates() {
        assert_eq!(signed_diff(7, 3), 4);
        assert_eq!(signed_diff(3, 7), -4);
        assert_eq!(signed_diff(u64::MAX, 0), Lateness::MAX);
        assert_eq!(signed_diff(0, u64::MAX), Lateness::MIN);
    }

    #[test]
    fn lcm_overflow() {
        assert_eq!(checked_lcm(4, 6), Some(12));
        assert_eq!(checked_lcm(u64::MAX, u64::MAX - 1), None);
        assert_eq!(divide_with_ceil(7, 2), 4);
    }
}
