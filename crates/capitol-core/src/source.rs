//! The `InsuranceSource` trait — everything the dashboard reads from or
//! writes to the back office.
//!
//! Implemented by the HTTP client in `capitol-cli`. The dashboard state
//! machine depends on this abstraction so it can run against an in-memory
//! source in tests.

use std::{fmt, future::Future};

use serde_json::Value;

use crate::{
  details::{ApplicationDetails, ClaimDetails},
  record::{ApplicationStatus, ClaimStatus, RawClaim},
};

pub trait InsuranceSource: Send + Sync {
  type Error: fmt::Display + fmt::Debug + Send + Sync + 'static;

  // ── Applications ──────────────────────────────────────────────────────

  /// `GET /applications`, one JSON value per record.
  ///
  /// Records are not decoded here. Their shape is checked by
  /// [`Normalizer`](crate::normalize::Normalizer), which drops a batch with
  /// any malformed record instead of failing the request.
  fn list_applications(
    &self,
  ) -> impl Future<Output = Result<Vec<Value>, Self::Error>> + Send + '_;

  /// `GET /applications/:id`
  fn get_application(
    &self,
    id: u64,
  ) -> impl Future<Output = Result<ApplicationDetails, Self::Error>> + Send + '_;

  /// Set the review status of application `id` in the hosted database.
  fn update_application_status(
    &self,
    id: u64,
    status: ApplicationStatus,
  ) -> impl Future<Output = Result<ApplicationStatus, Self::Error>> + Send + '_;

  // ── Claims ────────────────────────────────────────────────────────────

  /// `GET /claims`
  fn list_claims(&self) -> impl Future<Output = Result<Vec<RawClaim>, Self::Error>> + Send + '_;

  /// `GET /claims/:id`
  fn get_claim(
    &self,
    id: u64,
  ) -> impl Future<Output = Result<ClaimDetails, Self::Error>> + Send + '_;

  /// Set the approval status of claim `id` in the hosted database.
  fn update_claim_status(
    &self,
    id: u64,
    status: ClaimStatus,
  ) -> impl Future<Output = Result<ClaimStatus, Self::Error>> + Send + '_;
}
