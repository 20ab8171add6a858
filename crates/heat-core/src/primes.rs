//! Prime-counting workload.
//!
//! Deliberately naive: every candidate is tested by trial division, so the
//! CPU cost grows with `limit` instead of being optimised away by a sieve.

use crate::params::{int_param, Bounds, QueryParams};
use crate::timing::Stopwatch;
use crate::WorkloadResult;

/// Default upper limit.
pub const DEFAULT_LIMIT: u64 = 300_000;
/// Allowed upper limit.
pub const LIMIT_BOUNDS: Bounds = Bounds::new(10_000, 50_000_000);

/// Trial-division primality test.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }

    let root = (n as f64).sqrt() as u64;
    let mut divisor = 3;
    while divisor <= root {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }

    true
}

/// Count primes in `[2, limit]`.
pub fn count_primes(limit: u64) -> u64 {
    (2..=limit).filter(|&n| is_prime(n)).count() as u64
}

/// Clamped parameters for the prime-counting workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimeCountParams {
    limit: u64,
}

impl PrimeCountParams {
    /// Create parameters, clamping `limit` into range.
    pub fn new(limit: i64) -> Self {
        Self {
            limit: LIMIT_BOUNDS.clamp(limit) as u64,
        }
    }

    /// Build from the `limit` query parameter.
    pub fn from_query(query: &QueryParams) -> Self {
        Self::new(int_param(query, "limit", DEFAULT_LIMIT as i64))
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Count primes up to the limit on the calling thread.
    pub fn run(&self) -> WorkloadResult {
        let watch = Stopwatch::start();
        let count = count_primes(self.limit);

        WorkloadResult::Primes {
            limit: self.limit,
            count,
            ms: watch.elapsed_ms(),
        }
    }
}

impl Default for PrimeCountParams {
    fn default() -> Self {
        Self::from_query(&QueryParams::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::parse_query;

    const PRIMES_TO_100: [u64; 25] = [
        2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83,
        89, 97,
    ];

    // === is_prime Tests ===

    #[test]
    fn test_is_prime_small_values() {
        assert!(!is_prime(0));
        assert!(!is_prime(1));
        assert!(is_prime(2));
        assert!(is_prime(3));
        assert!(!is_prime(4));
        assert!(!is_prime(9));
        assert!(!is_prime(25));
    }

    #[test]
    fn test_is_prime_matches_reference_table() {
        for n in 2..=100 {
            assert_eq!(is_prime(n), PRIMES_TO_100.contains(&n), "n = {}", n);
        }
    }

    #[test]
    fn test_is_prime_square_of_prime() {
        // The square root itself must be tried as a divisor.
        assert!(!is_prime(97 * 97));
        assert!(!is_prime(7919 * 7919));
        assert!(is_prime(7919));
    }

    // === count_primes Tests ===

    #[test]
    fn test_count_primes_known_values() {
        assert_eq!(count_primes(1), 0);
        assert_eq!(count_primes(2), 1);
        assert_eq!(count_primes(100), 25);
        assert_eq!(count_primes(10_000), 1229);
        assert_eq!(count_primes(300_000), 25997);
    }

    #[test]
    fn test_count_primes_monotonic() {
        let mut previous = 0;
        for limit in (10_000..=20_000).step_by(997) {
            let count = count_primes(limit);
            assert!(count >= previous, "count dropped at limit {}", limit);
            previous = count;
        }
    }

    // === Parameter Tests ===

    #[test]
    fn test_params_default() {
        assert_eq!(PrimeCountParams::default().limit(), 300_000);
    }

    #[test]
    fn test_params_clamp() {
        assert_eq!(PrimeCountParams::from_query(&parse_query("limit=5")).limit(), 10_000);
        assert_eq!(
            PrimeCountParams::from_query(&parse_query("limit=999999999")).limit(),
            50_000_000
        );
        assert_eq!(PrimeCountParams::from_query(&parse_query("limit=abc")).limit(), 300_000);
    }

    #[test]
    fn test_run_reports_count() {
        let result = PrimeCountParams::new(10_000).run();

        match result {
            WorkloadResult::Primes { limit, count, .. } => {
                assert_eq!(limit, 10_000);
                assert_eq!(count, 1229);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
