//! Retry policy for upstream API requests
//!
//! The fetcher classifies every failed attempt as a [`Failure`] and asks
//! [`plan`] what to do next. Keeping the decision a pure function of the
//! configuration, the failure kind, and the attempt index makes the policy
//! testable without a network or a clock.
//!
//! Budget: every attempt counts, HTTP 429 included. A logical request gets
//! `max_retries_per_key × key_count` attempts, so each key is tried at least
//! `max_retries_per_key` times before the request is reported as exhausted.

use crate::config::RetryConfig;
use rand::Rng;
use std::fmt;
use std::time::Duration;

/// Why an attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// HTTP 429 from the API
    RateLimited,
    /// Any other non-200 status
    Status(u16),
    /// Request never produced a status (connect, timeout, body read)
    Transport(String),
}

impl Failure {
    /// Classify an HTTP status. Returns `None` for 200, the only success.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200 => None,
            429 => Some(Failure::RateLimited),
            other => Some(Failure::Status(other)),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::RateLimited => write!(f, "rate limited (HTTP 429)"),
            Failure::Status(code) => write!(f, "HTTP {}", code),
            Failure::Transport(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

/// What the fetcher does before its next attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryAction {
    /// Advance the key rotator
    pub rotate: bool,
    /// Pause before the next attempt
    pub wait: Duration,
}

/// Total attempts allowed for one logical request
pub fn max_attempts(config: &RetryConfig, key_count: usize) -> u32 {
    config
        .max_retries_per_key
        .saturating_mul(key_count.max(1) as u32)
}

/// True when `attempt` (zero based) is the last one of a pass over all keys
pub fn closes_cycle(attempt: u32, key_count: usize) -> bool {
    let n = key_count.max(1) as u32;
    (attempt + 1) % n == 0
}

/// Decide how to react to a failed attempt
///
/// * 429: rotate and wait `rate_limit_cooldown`.
/// * Anything else: when the attempt closes a full pass over the keys and a
///   `cycle_cooldown` is configured, wait that long instead of
///   `error_cooldown`. Rotation follows `rotate_on_error` either way, so a
///   key is only retried after every other key has had its turn.
pub fn plan(config: &RetryConfig, failure: &Failure, attempt: u32, key_count: usize) -> RetryAction {
    let action = match failure {
        Failure::RateLimited => RetryAction {
            rotate: true,
            wait: config.rate_limit_cooldown,
        },
        Failure::Status(_) | Failure::Transport(_) => match config.cycle_cooldown {
            Some(cooldown) if closes_cycle(attempt, key_count) => RetryAction {
                rotate: config.rotate_on_error,
                wait: cooldown,
            },
            _ => RetryAction {
                rotate: config.rotate_on_error,
                wait: config.error_cooldown,
            },
        },
    };

    if config.jitter && !action.wait.is_zero() {
        RetryAction {
            wait: add_jitter(action.wait),
            ..action
        }
    } else {
        action
    }
}

/// Add random jitter to a delay
///
/// Jitter is uniformly distributed between 0% and 100% of the delay.
/// This means the actual delay will be between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}
