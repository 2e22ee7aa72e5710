//! Fetch-with-retry and the per-screen query cache.

use std::{
  fmt,
  future::Future,
  time::{Duration, Instant},
};

use capitol_core::retry::RetryPolicy;

// ─── Retry executor ───────────────────────────────────────────────────────────

/// Run `op` until it succeeds or `policy` gives up, sleeping the policy's
/// backoff between attempts. Returns the last error.
pub async fn fetch_with_retry<T, E, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T, E>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T, E>>,
  E: fmt::Display,
{
  let mut failures = 0;
  loop {
    match op().await {
      Ok(value) => return Ok(value),
      Err(e) => {
        let message = e.to_string();
        if !policy.should_retry(failures, &message) {
          return Err(e);
        }
        let delay = policy.delay(failures);
        failures += 1;
        tracing::warn!(label, attempt = failures, ?delay, error = %message, "retrying request");
        tokio::time::sleep(delay).await;
      }
    }
  }
}

// ─── Query ────────────────────────────────────────────────────────────────────

/// Caching behaviour of one [`Query`].
#[derive(Debug, Clone, Copy)]
pub struct QueryOptions {
  /// Data younger than this is fresh and is not refetched on mount/focus.
  pub stale_time:       Duration,
  pub refetch_on_focus: bool,
  pub refetch_on_mount: bool,
  pub retry:            RetryPolicy,
}

impl Default for QueryOptions {
  fn default() -> Self {
    Self {
      stale_time:       Duration::from_secs(60),
      refetch_on_focus: true,
      refetch_on_mount: true,
      retry:            RetryPolicy::default(),
    }
  }
}

/// The `{data, is_loading, error}` view of one remote resource, plus the
/// bookkeeping needed to decide when to refetch it.
pub struct Query<T> {
  pub data:        Option<T>,
  /// A fetch is in flight and there is no data to show yet.
  pub is_loading:  bool,
  /// A fetch is in flight, with or without data.
  pub is_fetching: bool,
  pub error:       Option<anyhow::Error>,
  pub options:     QueryOptions,
  fetched_at:      Option<Instant>,
  invalidated:     bool,
}

impl<T> Query<T> {
  pub fn new(options: QueryOptions) -> Self {
    Self {
      data: None,
      is_loading: false,
      is_fetching: false,
      error: None,
      options,
      fetched_at: None,
      invalidated: false,
    }
  }

  /// Mark a fetch as started.
  pub fn begin(&mut self) {
    self.is_fetching = true;
    self.is_loading = self.data.is_none();
  }

  /// Record the outcome of a fetch. A failure keeps any previous data.
  pub fn resolve(&mut self, result: anyhow::Result<T>) {
    match result {
      Ok(data) => {
        self.data = Some(data);
        self.error = None;
        self.fetched_at = Some(Instant::now());
        self.invalidated = false;
      }
      Err(e) => self.error = Some(e),
    }
    self.is_fetching = false;
    self.is_loading = false;
  }

  /// Mark the data stale so the next mount or focus refetches it.
  pub fn invalidate(&mut self) { self.invalidated = true; }

  /// Forget everything, e.g. when the query now points at another record.
  pub fn reset(&mut self) { *self = Self::new(self.options); }

  pub fn is_stale(&self) -> bool {
    self.invalidated
      || self
        .fetched_at
        .is_none_or(|at| at.elapsed() >= self.options.stale_time)
  }

  pub fn should_fetch_on_mount(&self) -> bool {
    self.data.is_none() || (self.options.refetch_on_mount && self.is_stale())
  }

  pub fn should_fetch_on_focus(&self) -> bool { self.options.refetch_on_focus && self.is_stale() }

  /// Patch cached data in place without refetching.
  pub fn update(&mut self, patch: impl FnOnce(&mut T)) {
    if let Some(data) = self.data.as_mut() {
      patch(data);
    }
  }
}
