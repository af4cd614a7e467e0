use std::time::Duration;

use rand::Rng;

use crate::BackoffPolicy;

/// Delay before retry number `attempt` (0-based), with equal jitter: half
/// of the capped exponential delay plus a random share of the other half.
/// Never exceeds `max_delay_ms`.
pub fn backoff_delay(
    policy: &BackoffPolicy,
    attempt: u32,
) -> Duration {
    let ceiling = capped_delay_ms(policy, attempt);
    let half = ceiling / 2;
    let jitter = rand::thread_rng().gen_range(0..=ceiling - half);
    Duration::from_millis(half + jitter)
}

/// `base * 2^attempt`, capped at `max_delay_ms`.
pub(crate) fn capped_delay_ms(
    policy: &BackoffPolicy,
    attempt: u32,
) -> u64 {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    policy.base_delay_ms.saturating_mul(factor).min(policy.max_delay_ms)
}

/// True once `attempts` failed attempts reach the retry ceiling.
/// `max_retries == 0` never gives up.
pub fn retries_exhausted(
    policy: &BackoffPolicy,
    attempts: usize,
) -> bool {
    policy.max_retries != 0 && attempts >= policy.max_retries
}
