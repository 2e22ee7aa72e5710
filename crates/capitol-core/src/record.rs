//! Application and claim records — the wire shapes returned by the insurance
//! API and the display shape produced by the normalizer.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::table::TableRow;

// ─── Closed sets ─────────────────────────────────────────────────────────────

/// Customer category shown in the application list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerCategory {
  Private,
  Fleet,
}

impl CustomerCategory {
  /// Map the API's free-text `category` onto the binary category.
  ///
  /// `"fleet"` in any case is [`Fleet`](Self::Fleet); anything else,
  /// including the empty string, is [`Private`](Self::Private).
  pub fn from_raw(raw: &str) -> Self {
    if raw.trim().eq_ignore_ascii_case("fleet") {
      Self::Fleet
    } else {
      Self::Private
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Private => "private",
      Self::Fleet => "fleet",
    }
  }
}

impl fmt::Display for CustomerCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Motor insurance products offered by the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsuranceType {
  Teilkasko,
  Vollkasko,
  Haftpflicht,
}

impl InsuranceType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Teilkasko => "Teilkasko",
      Self::Vollkasko => "Vollkasko",
      Self::Haftpflicht => "Haftpflicht",
    }
  }
}

impl fmt::Display for InsuranceType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Review status of an insurance application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
  Pending,
  Approved,
  Declined,
  #[serde(rename = "Further Review Required")]
  FurtherReviewRequired,
}

impl ApplicationStatus {
  /// The statuses a reviewer can set from the detail screen.
  pub const DECISIONS: [Self; 3] = [Self::Approved, Self::Declined, Self::FurtherReviewRequired];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "Pending",
      Self::Approved => "Approved",
      Self::Declined => "Declined",
      Self::FurtherReviewRequired => "Further Review Required",
    }
  }
}

impl fmt::Display for ApplicationStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Approval status of a liability claim.
///
/// Claims carry their status as free text on the wire; use
/// [`ClaimStatus::from_label`] to recognise the known labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
  Pending,
  Approved,
  Rejected,
  #[serde(rename = "Review Required")]
  ReviewRequired,
}

impl ClaimStatus {
  pub const DECISIONS: [Self; 3] = [Self::Approved, Self::Rejected, Self::ReviewRequired];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "Pending",
      Self::Approved => "Approved",
      Self::Rejected => "Rejected",
      Self::ReviewRequired => "Review Required",
    }
  }

  pub fn from_label(label: &str) -> Option<Self> {
    [Self::Pending, Self::Approved, Self::Rejected, Self::ReviewRequired]
      .into_iter()
      .find(|s| s.as_str() == label)
  }
}

impl fmt::Display for ClaimStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Visual tone of a status badge, independent of any colour palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
  Positive,
  Waiting,
  Negative,
  Review,
}

impl StatusTone {
  /// Tone for a status label of either record kind. Unknown labels get the
  /// review tone.
  pub fn for_label(label: &str) -> Self {
    match label {
      "Approved" => Self::Positive,
      "Pending" => Self::Waiting,
      "Declined" | "Rejected" => Self::Negative,
      _ => Self::Review,
    }
  }
}

// ─── Wire shapes ─────────────────────────────────────────────────────────────

/// One entry of `GET /applications`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawApplication {
  #[serde(deserialize_with = "numeric_id")]
  pub id:             u64,
  pub name:           String,
  #[serde(default)]
  pub category:       String,
  pub insurance_type: InsuranceType,
  pub status:         ApplicationStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub amount:         Option<f64>,
}

/// One entry of `GET /claims`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawClaim {
  #[serde(deserialize_with = "numeric_id")]
  pub claim_id:        u64,
  pub applicant_name:  String,
  pub claim_type:      String,
  pub insurance_type:  String,
  #[serde(default)]
  pub approval_status: Option<String>,
}

impl RawClaim {
  /// Status label for display; claims without a status read as pending.
  pub fn status_label(&self) -> &str {
    self
      .approval_status
      .as_deref()
      .unwrap_or(ClaimStatus::Pending.as_str())
  }
}

impl TableRow for RawClaim {
  fn key(&self) -> String { self.claim_id.to_string() }
}

/// Accept identifiers encoded either as JSON numbers or numeric strings.
fn numeric_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum WireId {
    Number(u64),
    Text(String),
  }

  match WireId::deserialize(deserializer)? {
    WireId::Number(n) => Ok(n),
    WireId::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
  }
}

// ─── Display shape ───────────────────────────────────────────────────────────

/// A display-ready application row, produced by
/// [`Normalizer`](crate::normalize::Normalizer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
  pub id:               String,
  pub applicant_name:   String,
  pub type_of_customer: CustomerCategory,
  pub insurance_type:   InsuranceType,
  pub status:           ApplicationStatus,
  pub requested_date:   NaiveDate,
  pub amount:           f64,
}

impl TableRow for ApplicationRecord {
  fn key(&self) -> String { self.id.clone() }
}
