//! Retry policy for calls to the external insurance API.
//!
//! The policy is plain data; the executor that sleeps between attempts lives
//! with the async client.

use std::time::Duration;

/// Upper bound on the delay between two attempts.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// When and how often a failed request is retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
  /// Retries after the first failure; total attempts is one more.
  pub max_retries:  u32,
  /// Delay before the retry that follows failure number `n` (zero-based).
  pub backoff:      fn(u32) -> Duration,
  /// Inspects the error text; `false` stops retrying immediately.
  pub is_retryable: fn(&str) -> bool,
}

impl RetryPolicy {
  /// Policy for status mutations: retry every failure up to three times.
  pub fn mutations() -> Self {
    Self {
      is_retryable: always,
      ..Self::default()
    }
  }

  /// Never retry.
  pub fn none() -> Self {
    Self {
      max_retries: 0,
      ..Self::default()
    }
  }

  /// Whether to retry after `failures_so_far` earlier failures and a new
  /// failure described by `message`.
  pub fn should_retry(&self, failures_so_far: u32, message: &str) -> bool {
    failures_so_far < self.max_retries && (self.is_retryable)(message)
  }

  pub fn delay(&self, failures_so_far: u32) -> Duration { (self.backoff)(failures_so_far) }
}

impl Default for RetryPolicy {
  /// Three retries with exponential backoff, none for "not found" errors.
  fn default() -> Self {
    Self {
      max_retries:  3,
      backoff:      exponential_backoff,
      is_retryable: unless_not_found,
    }
  }
}

/// `min(1000 * 2^attempt, 30000)` milliseconds.
pub fn exponential_backoff(attempt: u32) -> Duration {
  let millis = 2u64
    .checked_pow(attempt)
    .and_then(|factor| factor.checked_mul(1000))
    .unwrap_or(u64::MAX);
  Duration::from_millis(millis).min(MAX_BACKOFF)
}

/// Retry anything except errors whose text says the resource is missing.
pub fn unless_not_found(message: &str) -> bool {
  !(message.contains("404") || message.to_lowercase().contains("not found"))
}

fn always(_message: &str) -> bool { true }
