//! Unit tests for `capitol-core`.

mod normalize;

use chrono::NaiveDate;
use rand_core::{Error as RngError, RngCore, impls};

use crate::record::{ApplicationStatus, InsuranceType, RawApplication};

/// Deterministic RNG: yields the queued values in order, then repeats the
/// last one.
pub(crate) struct ScriptedRng {
  values: Vec<u32>,
  next:   usize,
}

impl ScriptedRng {
  pub(crate) fn new(values: &[u32]) -> Self {
    Self {
      values: values.to_vec(),
      next:   0,
    }
  }
}

impl RngCore for ScriptedRng {
  fn next_u32(&mut self) -> u32 {
    let index = self.next.min(self.values.len().saturating_sub(1));
    self.next += 1;
    self.values.get(index).copied().unwrap_or(0)
  }

  fn next_u64(&mut self) -> u64 { impls::next_u64_via_u32(self) }

  fn fill_bytes(&mut self, dest: &mut [u8]) { impls::fill_bytes_via_next(self, dest) }

  fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), RngError> {
    self.fill_bytes(dest);
    Ok(())
  }
}

pub(crate) fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, 30).unwrap() }

pub(crate) fn raw(id: u64, name: &str, status: ApplicationStatus) -> RawApplication {
  RawApplication {
    id,
    name: name.into(),
    category: "private".into(),
    insurance_type: InsuranceType::Vollkasko,
    status,
    amount: None,
  }
}
