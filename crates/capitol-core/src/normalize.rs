//! Normalization of raw application records into display rows.
//!
//! Two fields are derived rather than copied:
//!
//! - **status** is sticky per application id. The first status observed for
//!   an id is kept in a [`StatusCache`] and returned on every later
//!   normalization, even if the API reports a different one.
//! - **amount** is passed through when the API supplies one. Otherwise it is
//!   synthesized from a random requested date within the last
//!   [`REQUEST_WINDOW_DAYS`] days. The date is drawn fresh on every call, so
//!   the synthesized amount is not stable across calls.
//!
//! Records arrive as raw JSON values and are decoded here, so a record of
//! unexpected shape fails normalization rather than the request.

use std::collections::HashMap;

use chrono::{Days, Local, NaiveDate};
use rand_core::{OsRng, RngCore};
use serde::Deserialize;
use serde_json::Value;

use crate::{
  Error, Result,
  record::{ApplicationRecord, ApplicationStatus, CustomerCategory, RawApplication},
};

/// Lower bound of a synthesized amount.
pub const AMOUNT_FLOOR: f64 = 200.0;
/// Upper bound of a synthesized amount.
pub const AMOUNT_CEILING: f64 = 1500.0;
/// Requested dates are drawn from `[today - REQUEST_WINDOW_DAYS, today]`.
pub const REQUEST_WINDOW_DAYS: u32 = 30;

// ─── Status cache ────────────────────────────────────────────────────────────

/// First-write-wins memo of application statuses, keyed by record id.
///
/// The cache is an explicit value owned by the caller. Views that need
/// isolated status memory hold their own instance.
#[derive(Debug, Clone, Default)]
pub struct StatusCache {
  entries: HashMap<String, ApplicationStatus>,
}

impl StatusCache {
  pub fn new() -> Self { Self::default() }

  /// The memoized status for `id`, if one has been recorded.
  pub fn get(&self, id: &str) -> Option<ApplicationStatus> { self.entries.get(id).copied() }

  /// Return the memoized status for `id`, recording `observed` if there is
  /// none yet.
  pub fn resolve(&mut self, id: &str, observed: ApplicationStatus) -> ApplicationStatus {
    *self.entries.entry(id.to_owned()).or_insert(observed)
  }

  /// Forget the status for `id`; the next normalization records afresh.
  pub fn invalidate(&mut self, id: &str) -> Option<ApplicationStatus> { self.entries.remove(id) }

  pub fn clear(&mut self) { self.entries.clear(); }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

// ─── Amount ──────────────────────────────────────────────────────────────────

/// Estimated amount for a request that is `days_since_request` days old.
///
/// Grows by 100 over the request window and is clamped to
/// `[AMOUNT_FLOOR, AMOUNT_CEILING]`.
pub fn synthesize_amount(days_since_request: u32) -> f64 {
  let growth = days_since_request.saturating_mul(100) / REQUEST_WINDOW_DAYS;
  (AMOUNT_FLOOR + f64::from(growth)).clamp(AMOUNT_FLOOR, AMOUNT_CEILING)
}

// ─── Normalizer ──────────────────────────────────────────────────────────────

/// Maps [`RawApplication`]s to [`ApplicationRecord`]s.
///
/// Generic over the random source so tests can supply a deterministic one.
pub struct Normalizer<R = OsRng> {
  rng:   R,
  today: NaiveDate,
}

impl Normalizer<OsRng> {
  /// A normalizer drawing from the OS RNG, anchored at the local date.
  pub fn new() -> Self {
    Self {
      rng:   OsRng,
      today: Local::now().date_naive(),
    }
  }
}

impl Default for Normalizer<OsRng> {
  fn default() -> Self { Self::new() }
}

impl<R: RngCore> Normalizer<R> {
  pub fn with_rng(rng: R, today: NaiveDate) -> Self { Self { rng, today } }

  pub fn today(&self) -> NaiveDate { self.today }

  /// Normalize a batch, preserving length and order.
  ///
  /// The batch is validated before anything is derived, so a failing batch
  /// leaves `cache` untouched.
  pub fn normalize(
    &mut self,
    raw: &[RawApplication],
    cache: &mut StatusCache,
  ) -> Result<Vec<ApplicationRecord>> {
    raw.iter().try_for_each(validate)?;
    Ok(raw.iter().map(|item| self.normalize_one(item, cache)).collect())
  }

  /// Decode a batch of JSON records, then [`normalize`](Self::normalize) it.
  pub fn normalize_values(
    &mut self,
    raw: &[Value],
    cache: &mut StatusCache,
  ) -> Result<Vec<ApplicationRecord>> {
    let decoded = decode(raw)?;
    self.normalize(&decoded, cache)
  }

  /// Like [`normalize_values`](Self::normalize_values), but a failure
  /// anywhere in the batch yields an empty result. The failure is logged,
  /// not returned.
  pub fn normalize_or_empty(
    &mut self,
    raw: &[Value],
    cache: &mut StatusCache,
  ) -> Vec<ApplicationRecord> {
    match self.normalize_values(raw, cache) {
      Ok(records) => records,
      Err(e) => {
        tracing::error!(error = %e, batch = raw.len(), "dropping application batch");
        Vec::new()
      }
    }
  }

  fn normalize_one(&mut self, item: &RawApplication, cache: &mut StatusCache) -> ApplicationRecord {
    let id = item.id.to_string();
    let days_since_request = self.rng.next_u32() % (REQUEST_WINDOW_DAYS + 1);
    let requested_date = self
      .today
      .checked_sub_days(Days::new(u64::from(days_since_request)))
      .unwrap_or(self.today);
    let status = cache.resolve(&id, item.status);

    ApplicationRecord {
      applicant_name: item.name.clone(),
      type_of_customer: CustomerCategory::from_raw(&item.category),
      insurance_type: item.insurance_type,
      status,
      requested_date,
      amount: item
        .amount
        .unwrap_or_else(|| synthesize_amount(days_since_request)),
      id,
    }
  }
}

/// Decode every record of a batch. The first record that does not have the
/// shape of a [`RawApplication`] fails the batch.
pub fn decode(raw: &[Value]) -> Result<Vec<RawApplication>> {
  raw
    .iter()
    .map(|value| {
      RawApplication::deserialize(value).map_err(|e| Error::Transform {
        id:     record_id(value),
        reason: e.to_string(),
      })
    })
    .collect()
}

/// The record's `id` as text, or `?` when it has none.
fn record_id(value: &Value) -> String {
  match value.get("id") {
    Some(Value::String(id)) => id.clone(),
    Some(Value::Number(id)) => id.to_string(),
    _ => "?".to_string(),
  }
}

fn validate(item: &RawApplication) -> Result<()> {
  match item.amount {
    Some(amount) if !amount.is_finite() || amount < 0.0 => Err(Error::Transform {
      id:     item.id.to_string(),
      reason: format!("amount {amount} is not a non-negative finite number"),
    }),
    _ => Ok(()),
  }
}
