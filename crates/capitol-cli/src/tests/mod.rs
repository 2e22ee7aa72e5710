//! Tests for the dashboard binary.

mod client;

use std::{collections::HashMap, sync::Mutex, time::Duration};

use anyhow::anyhow;
use capitol_core::{
  Error,
  details::{
    ApplicationDetails, ClaimDetails, DriverRiskAssessment, PastClaims, VehicleRiskAssessment,
  },
  record::{ApplicationStatus, ClaimStatus, InsuranceType, RawApplication, RawClaim},
  retry::RetryPolicy,
  source::InsuranceSource,
};
use serde_json::Value;

/// The default policy without the waiting.
pub fn instant(max_retries: u32) -> RetryPolicy {
  RetryPolicy {
    max_retries,
    backoff: |_| Duration::ZERO,
    ..RetryPolicy::default()
  }
}

/// The mutation policy without the waiting.
pub fn instant_mutations() -> RetryPolicy {
  RetryPolicy {
    backoff: |_| Duration::ZERO,
    ..RetryPolicy::mutations()
  }
}

// ─── Fixtures ─────────────────────────────────────────────────────────────────

pub fn application(id: u64, name: &str, status: ApplicationStatus) -> RawApplication {
  RawApplication {
    id,
    name: name.to_string(),
    category: "private".to_string(),
    insurance_type: InsuranceType::Teilkasko,
    status,
    amount: Some(450.0),
  }
}

pub fn claim(id: u64, name: &str, status: Option<&str>) -> RawClaim {
  RawClaim {
    claim_id:        id,
    applicant_name:  name.to_string(),
    claim_type:      "collision".to_string(),
    insurance_type:  "vollkasko".to_string(),
    approval_status: status.map(str::to_owned),
  }
}

pub fn details(id: u64) -> ApplicationDetails {
  ApplicationDetails {
    id,
    status: Some(ApplicationStatus::Pending),
    vehicle_risk_assessment: VehicleRiskAssessment {
      vehicle_name:           "VW Golf".to_string(),
      construction_year_diff: 6,
      vin:                    "WVWZZZ1KZAW000001".to_string(),
      co2_emissions:          "142g/km".to_string(),
      risk_score:             Some(4.5),
    },
    driver_risk_assessment: DriverRiskAssessment {
      name:        "Anna Schmidt".to_string(),
      license:     "B".to_string(),
      age:         Some(34),
      past_claims: PastClaims {
        incidents: 1,
        period:    "Last 3 years".to_string(),
      },
      risk_score:  Some(8.1),
    },
  }
}

pub fn claim_details(id: u64) -> ClaimDetails {
  ClaimDetails {
    id,
    claimant_name: "John Doe".to_string(),
    claim_type: "collision".to_string(),
    insurance_type: "Vollkasko".to_string(),
    insurance_id: 77,
    insurance_end_date: Some("2025-12-31".to_string()),
    accident_description: "Rear-ended at a traffic light.".to_string(),
    approval_status: None,
  }
}

// ─── In-memory source ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeState {
  pub applications:        Vec<RawApplication>,
  /// Served after `applications`, as is.
  pub extra_records:       Vec<Value>,
  pub claims:              Vec<RawClaim>,
  pub details:             HashMap<u64, ApplicationDetails>,
  pub claim_details:       HashMap<u64, ClaimDetails>,
  /// List calls that fail before one succeeds.
  pub list_failures:       u32,
  pub fail_updates:        bool,
  /// Every call, e.g. `"GET /applications/3"`.
  pub calls:               Vec<String>,
  pub application_updates: Vec<(u64, ApplicationStatus)>,
  pub claim_updates:       Vec<(u64, ClaimStatus)>,
}

#[derive(Default)]
pub struct FakeSource {
  pub state: Mutex<FakeState>,
}

impl FakeSource {
  pub fn new(state: FakeState) -> Self {
    Self {
      state: Mutex::new(state),
    }
  }

  pub fn calls(&self) -> Vec<String> { self.state.lock().unwrap().calls.clone() }

  fn record(&self, call: String) -> std::sync::MutexGuard<'_, FakeState> {
    let mut state = self.state.lock().unwrap();
    state.calls.push(call);
    state
  }

  fn fail_list(state: &mut FakeState) -> anyhow::Result<()> {
    if state.list_failures > 0 {
      state.list_failures -= 1;
      return Err(anyhow!("GET → 503 Service Unavailable"));
    }
    Ok(())
  }
}

impl InsuranceSource for FakeSource {
  type Error = anyhow::Error;

  async fn list_applications(&self) -> anyhow::Result<Vec<Value>> {
    let mut state = self.record("GET /applications".to_string());
    Self::fail_list(&mut state)?;
    let mut records = state
      .applications
      .iter()
      .map(serde_json::to_value)
      .collect::<Result<Vec<_>, _>>()?;
    records.extend(state.extra_records.iter().cloned());
    Ok(records)
  }

  async fn get_application(&self, id: u64) -> anyhow::Result<ApplicationDetails> {
    let state = self.record(format!("GET /applications/{id}"));
    state.details.get(&id).cloned().ok_or_else(|| {
      Error::NotFound {
        kind: "application",
        id:   id.to_string(),
      }
      .into()
    })
  }

  async fn update_application_status(
    &self,
    id: u64,
    status: ApplicationStatus,
  ) -> anyhow::Result<ApplicationStatus> {
    let mut state = self.record(format!("PATCH applications {id}"));
    if state.fail_updates {
      return Err(anyhow!("Failed to update application status: permission denied"));
    }
    state.application_updates.push((id, status));
    Ok(status)
  }

  async fn list_claims(&self) -> anyhow::Result<Vec<RawClaim>> {
    let mut state = self.record("GET /claims".to_string());
    Self::fail_list(&mut state)?;
    Ok(state.claims.clone())
  }

  async fn get_claim(&self, id: u64) -> anyhow::Result<ClaimDetails> {
    let state = self.record(format!("GET /claims/{id}"));
    state.claim_details.get(&id).cloned().ok_or_else(|| {
      Error::NotFound {
        kind: "claim",
        id:   id.to_string(),
      }
      .into()
    })
  }

  async fn update_claim_status(&self, id: u64, status: ClaimStatus) -> anyhow::Result<ClaimStatus> {
    let mut state = self.record(format!("PATCH claims {id}"));
    if state.fail_updates {
      return Err(anyhow!("Failed to update claim status: permission denied"));
    }
    state.claim_updates.push((id, status));
    Ok(status)
  }
}
