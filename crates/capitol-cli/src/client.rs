//! Async HTTP client for the insurance REST API and the hosted status
//! database.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use capitol_core::{
  details::{ApplicationDetails, ClaimDetails},
  record::{ApplicationStatus, ClaimStatus, RawClaim},
  source::InsuranceSource,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Connection settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Base URL of the insurance REST API.
  pub base_url:     String,
  /// Base URL of the PostgREST database that stores review statuses.
  pub database_url: Option<String>,
  /// API key for `database_url`, sent as `apikey` and bearer token.
  pub database_key: Option<String>,
}

/// Async HTTP client for the insurance API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let resp = self
      .client
      .get(self.url(path))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET {path} → {}", resp.status()));
    }
    resp
      .json()
      .await
      .with_context(|| format!("deserialising {path}"))
  }

  /// `PATCH <db>/rest/v1/<table>?<id_column>=eq.<id>` with `{field: value}`.
  async fn patch_status(
    &self,
    what: &str,
    table: &str,
    id_column: &str,
    id: u64,
    field: &str,
    value: &str,
  ) -> Result<()> {
    let (Some(database_url), Some(key)) = (&self.config.database_url, &self.config.database_key)
    else {
      bail!("Failed to update {what} status: database URL and key are not configured");
    };

    let mut body = serde_json::Map::new();
    body.insert(field.to_string(), value.into());

    let resp = self
      .client
      .patch(format!(
        "{}/rest/v1/{table}",
        database_url.trim_end_matches('/')
      ))
      .query(&[(id_column, format!("eq.{id}"))])
      .header("apikey", key)
      .bearer_auth(key)
      .header("Prefer", "return=minimal")
      .json(&body)
      .send()
      .await
      .with_context(|| format!("Failed to update {what} status"))?;

    let status = resp.status();
    if !status.is_success() {
      let text = resp.text().await.unwrap_or_default();
      let message = error_message(&text).unwrap_or_else(|| status.to_string());
      bail!("Failed to update {what} status: {message}");
    }

    tracing::info!(table, id, %value, "status updated");
    Ok(())
  }
}

/// The `message` of a PostgREST error body, if the body is one.
fn error_message(body: &str) -> Option<String> {
  let value: serde_json::Value = serde_json::from_str(body).ok()?;
  value.get("message")?.as_str().map(str::to_owned)
}

impl InsuranceSource for ApiClient {
  type Error = anyhow::Error;

  /// `GET /applications`
  async fn list_applications(&self) -> Result<Vec<Value>> {
    let applications: Vec<Value> = self.get_json("/applications").await?;
    tracing::info!(count = applications.len(), "applications fetched");
    Ok(applications)
  }

  /// `GET /applications/:id`
  async fn get_application(&self, id: u64) -> Result<ApplicationDetails> {
    self.get_json(&format!("/applications/{id}")).await
  }

  async fn update_application_status(
    &self,
    id: u64,
    status: ApplicationStatus,
  ) -> Result<ApplicationStatus> {
    self
      .patch_status(
        "application",
        "applications",
        "application_id",
        id,
        "status",
        status.as_str(),
      )
      .await?;
    Ok(status)
  }

  /// `GET /claims`
  async fn list_claims(&self) -> Result<Vec<RawClaim>> {
    let claims: Vec<RawClaim> = self.get_json("/claims").await?;
    tracing::info!(count = claims.len(), "claims fetched");
    Ok(claims)
  }

  /// `GET /claims/:id`
  async fn get_claim(&self, id: u64) -> Result<ClaimDetails> {
    self.get_json(&format!("/claims/{id}")).await
  }

  async fn update_claim_status(&self, id: u64, status: ClaimStatus) -> Result<ClaimStatus> {
    self
      .patch_status("claim", "claims", "id", id, "approval_status", status.as_str())
      .await?;
    Ok(status)
  }
}
