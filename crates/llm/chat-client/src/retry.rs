//! Rate-limit retry: exponential backoff with jitter, driven by an explicit
//! state machine.
//!
//! Backoff formula: `min(base * multiplier^attempt, max) + jitter` where
//! jitter is a non-negative term bounded by `jitter_fraction` of the capped
//! delay. Below the cap, consecutive delays never decrease.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Configuration for exponential backoff.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Initial backoff in milliseconds.
    pub base_ms: u64,
    /// Maximum backoff cap in milliseconds.
    pub max_ms: u64,
    /// Exponential growth multiplier per attempt.
    pub multiplier: f64,
    /// Jitter bound as a fraction of the computed backoff (0.0–1.0).
    pub jitter_fraction: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_ms: 1_000,
            max_ms: 16_000,
            multiplier: 2.0,
            jitter_fraction: 0.25,
        }
    }
}

/// How often to attempt an operation that keeps getting rate limited.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub backoff: BackoffConfig,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffConfig::default(),
        }
    }
}

/// Terminal outcome of [`run`] when the operation never succeeded.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt was rate limited; `source` is the last signal.
    RateLimited { attempts: u32, source: E },
    /// A non-rate-limit error; surfaced immediately without retrying.
    Fatal(E),
}

/// Delay before re-attempting after the 0-indexed `attempt` was rate limited.
pub fn next_backoff(attempt: u32, config: &BackoffConfig) -> Duration {
    let raw = config.base_ms as f64 * config.multiplier.powi(attempt as i32);
    let capped = raw.min(config.max_ms as f64);
    let jitter = pseudo_rand(attempt) * capped * config.jitter_fraction;
    Duration::from_millis((capped + jitter) as u64)
}

/// Float in [0, 1) from a single LCG step seeded by `attempt`; spreads
/// retries without a rand dependency.
fn pseudo_rand(attempt: u32) -> f64 {
    const A: u64 = 1_664_525;
    const C: u64 = 1_013_904_223;
    const M: u64 = 1u64 << 32;
    let state = A.wrapping_mul(attempt as u64).wrapping_add(C) % M;
    state as f64 / M as f64
}

enum RetryState<T, E> {
    Attempting(u32),
    Succeeded(T),
    RateLimited { attempt: u32, source: E },
    Failed(E),
}

/// Runs `op` until it succeeds, fails with a non-rate-limit error, or
/// exhausts `policy.max_attempts` rate-limited attempts.
///
/// `classify` decides whether an error is a rate-limit signal; anything else
/// fails immediately. `op` receives the 0-indexed attempt number.
pub async fn run<T, E, C, F, Fut>(
    policy: &RetryPolicy,
    classify: C,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    C: Fn(&E) -> bool,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut state = RetryState::Attempting(0);

    loop {
        state = match state {
            RetryState::Attempting(attempt) => match op(attempt).await {
                Ok(value) => RetryState::Succeeded(value),
                Err(source) if classify(&source) => RetryState::RateLimited { attempt, source },
                Err(source) => RetryState::Failed(source),
            },
            RetryState::RateLimited { attempt, source } => {
                let attempts = attempt + 1;
                if attempts >= policy.max_attempts {
                    return Err(RetryError::RateLimited { attempts, source });
                }
                let delay = next_backoff(attempt, &policy.backoff);
                debug!(
                    attempt = attempts,
                    delay_ms = delay.as_millis() as u64,
                    "rate limited; backing off"
                );
                tokio::time::sleep(delay).await;
                RetryState::Attempting(attempts)
            }
            RetryState::Succeeded(value) => return Ok(value),
            RetryState::Failed(source) => return Err(RetryError::Fatal(source)),
        };
    }
}
