//! Attempt loop: run a closure until it succeeds, the policy says stop, or the
//! run is killed.

use super::policy::{RetryDecision, RetryPolicy};
use crate::control::CancelSignals;

/// Final result of an attempt loop and how many attempts it took.
#[derive(Debug)]
pub struct AttemptReport<T, E> {
    pub result: Result<T, E>,
    pub attempts: u32,
}

/// Runs `f(attempt)` (1-based) until it returns `Ok`, the attempt limit is
/// reached, or `signals` reports a kill. Between attempts, sleeps for the
/// policy's backoff when it is non-zero.
pub fn run_attempts<T, E, F>(
    policy: &RetryPolicy,
    signals: &CancelSignals,
    mut f: F,
) -> AttemptReport<T, E>
where
    F: FnMut(u32) -> Result<T, E>,
{
    let mut attempt = 1u32;
    loop {
        match f(attempt) {
            Ok(v) => {
                return AttemptReport {
                    result: Ok(v),
                    attempts: attempt,
                }
            }
            Err(e) => match policy.decide(attempt, signals.kill_requested()) {
                RetryDecision::NoRetry => {
                    return AttemptReport {
                        result: Err(e),
                        attempts: attempt,
                    }
                }
                RetryDecision::RetryAfter(d) => {
                    if !d.is_zero() {
                        std::thread::sleep(d);
                    }
                    attempt += 1;
                }
            },
        }
    }
}
