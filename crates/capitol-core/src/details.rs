//! Detail records served by `GET /applications/:id` and `GET /claims/:id`.

use serde::{Deserialize, Serialize};

use crate::record::ApplicationStatus;

// ─── Risk ────────────────────────────────────────────────────────────────────

/// Coarse bucket for a 1–10 risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
  Low,
  Medium,
  High,
}

impl RiskLevel {
  /// `> 7` is high, `> 4` is medium, everything else is low.
  pub fn from_score(score: f64) -> Self {
    if score > 7.0 {
      Self::High
    } else if score > 4.0 {
      Self::Medium
    } else {
      Self::Low
    }
  }
}

/// Formats a risk score as `"6.00/10"`, or `"N/A/10"` when absent or zero.
pub fn format_risk_score(score: Option<f64>) -> String {
  match score {
    Some(s) if s != 0.0 => format!("{s:.2}/10"),
    _ => "N/A/10".to_string(),
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRiskAssessment {
  pub vehicle_name:           String,
  /// Vehicle age in years.
  pub construction_year_diff: i32,
  pub vin:                    String,
  /// Pre-formatted, e.g. `"142g/km"`.
  pub co2_emissions:          String,
  pub risk_score:             Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PastClaims {
  pub incidents: u32,
  /// Human-readable window, e.g. `"Last 3 years"`.
  pub period:    String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRiskAssessment {
  pub name:        String,
  pub license:     String,
  pub age:         Option<u32>,
  pub past_claims: PastClaims,
  pub risk_score:  Option<f64>,
}

// ─── Details ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDetails {
  pub id:                      u64,
  #[serde(default)]
  pub status:                  Option<ApplicationStatus>,
  pub vehicle_risk_assessment: VehicleRiskAssessment,
  pub driver_risk_assessment:  DriverRiskAssessment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimDetails {
  pub id:                   u64,
  pub claimant_name:        String,
  pub claim_type:           String,
  pub insurance_type:       String,
  pub insurance_id:         u64,
  #[serde(default)]
  pub insurance_end_date:   Option<String>,
  pub accident_description: String,
  #[serde(default)]
  pub approval_status:      Option<String>,
}
