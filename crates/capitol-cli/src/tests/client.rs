use std::{
  collections::HashMap,
  sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use axum::{
  Json, Router,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
  routing::{get, patch},
};
use capitol_core::{
  normalize::decode,
  record::{ApplicationStatus, ClaimStatus, InsuranceType},
  source::InsuranceSource,
  table::TableRender,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use super::{instant, instant_mutations};
use crate::{
  app::{App, Command},
  client::{ApiClient, ApiConfig},
  fetch::QueryOptions,
};

// ─── Mock server ──────────────────────────────────────────────────────────────

/// One request seen by the mock database.
#[derive(Debug, Clone)]
struct Patch {
  table:         String,
  query:         HashMap<String, String>,
  apikey:        Option<String>,
  authorization: Option<String>,
  body:          Value,
}

type Seen = Arc<Mutex<Vec<Patch>>>;

async fn list_applications() -> Json<Value> {
  Json(json!([
    { "id": 1, "name": "Anna Schmidt", "category": "FLEET",
      "insurance_type": "Vollkasko", "status": "Pending" },
    { "id": "2", "name": "Ben Weber", "category": "private",
      "insurance_type": "Haftpflicht", "status": "Further Review Required", "amount": 980.5 },
  ]))
}

async fn get_application(Path(id): Path<u64>) -> impl IntoResponse {
  if id != 1 {
    return (StatusCode::NOT_FOUND, Json(json!({ "error": "Application not found" })));
  }
  (
    StatusCode::OK,
    Json(json!({
      "id": 1,
      "status": "Pending",
      "vehicle_risk_assessment": {
        "vehicle_name": "VW Golf", "construction_year_diff": 6,
        "vin": "WVWZZZ1KZAW000001", "co2_emissions": "142g/km", "risk_score": 4.5
      },
      "driver_risk_assessment": {
        "name": "Anna Schmidt", "license": "B", "age": 34,
        "past_claims": { "incidents": 1, "period": "Last 3 years" }, "risk_score": 8.1
      }
    })),
  )
}

async fn list_claims() -> Json<Value> {
  Json(json!([
    { "claim_id": 5, "applicant_name": "john doe", "claim_type": "theft",
      "insurance_type": "teilkasko", "approval_status": null },
  ]))
}

async fn record_patch(
  State(seen): State<Seen>,
  Path(table): Path<String>,
  Query(query): Query<HashMap<String, String>>,
  headers: HeaderMap,
  Json(body): Json<Value>,
) -> impl IntoResponse {
  let header = |name: &str| {
    headers
      .get(name)
      .and_then(|v| v.to_str().ok())
      .map(str::to_owned)
  };
  seen.lock().unwrap().push(Patch {
    table,
    query,
    apikey: header("apikey"),
    authorization: header("authorization"),
    body,
  });
  StatusCode::NO_CONTENT
}

async fn reject_patch() -> impl IntoResponse {
  (
    StatusCode::UNAUTHORIZED,
    Json(json!({ "message": "permission denied for table applications", "code": "42501" })),
  )
}

async fn serve(router: Router) -> String {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
  format!("http://{addr}")
}

/// API and database on one mock server; returns the client and the PATCHes
/// it receives.
async fn setup() -> (ApiClient, Seen) {
  let seen = Seen::default();
  let router = Router::new()
    .route("/applications", get(list_applications))
    .route("/applications/{id}", get(get_application))
    .route("/claims", get(list_claims))
    .route("/rest/v1/{table}", patch(record_patch))
    .with_state(seen.clone());
  let base = serve(router).await;

  let client = ApiClient::new(ApiConfig {
    base_url:     format!("{base}/"),
    database_url: Some(base),
    database_key: Some("anon-key".to_string()),
  })
  .unwrap();
  (client, seen)
}

// ─── Reads ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn lists_applications() {
  let (client, _) = setup().await;
  let applications = client.list_applications().await.unwrap();

  assert_eq!(applications.len(), 2);
  let applications = decode(&applications).unwrap();
  assert_eq!(applications[0].id, 1);
  assert_eq!(applications[0].category, "FLEET");
  assert_eq!(applications[0].amount, None);
  assert_eq!(applications[1].id, 2);
  assert_eq!(applications[1].insurance_type, InsuranceType::Haftpflicht);
  assert_eq!(applications[1].status, ApplicationStatus::FurtherReviewRequired);
  assert_eq!(applications[1].amount, Some(980.5));
}

#[tokio::test]
async fn fetches_application_details() {
  let (client, _) = setup().await;
  let details = client.get_application(1).await.unwrap();

  assert_eq!(details.status, Some(ApplicationStatus::Pending));
  assert_eq!(details.vehicle_risk_assessment.vin, "WVWZZZ1KZAW000001");
  assert_eq!(details.driver_risk_assessment.past_claims.incidents, 1);
}

#[tokio::test]
async fn missing_application_reports_404() {
  let (client, _) = setup().await;
  let message = client.get_application(9).await.unwrap_err().to_string();

  assert_eq!(message, "GET /applications/9 → 404 Not Found");
  assert!(!capitol_core::retry::unless_not_found(&message));
}

#[tokio::test]
async fn lists_claims_with_missing_status() {
  let (client, _) = setup().await;
  let claims = client.list_claims().await.unwrap();

  assert_eq!(claims.len(), 1);
  assert_eq!(claims[0].claim_id, 5);
  assert_eq!(claims[0].status_label(), "Pending");
}

#[tokio::test]
async fn unreachable_api_is_an_error() {
  let client = ApiClient::new(ApiConfig {
    base_url:     "http://127.0.0.1:9".to_string(),
    database_url: None,
    database_key: None,
  })
  .unwrap();
  let err = client.list_claims().await.unwrap_err();
  assert!(err.to_string().contains("GET /claims failed"));
}

#[tokio::test]
async fn malformed_application_empties_the_table() {
  let hits = Arc::new(AtomicUsize::new(0));
  let router = Router::new()
    .route(
      "/applications",
      get(|State(hits): State<Arc<AtomicUsize>>| async move {
        hits.fetch_add(1, Ordering::SeqCst);
        Json(json!([
          { "id": 1, "name": "Anna Schmidt", "category": "private",
            "insurance_type": "Vollkasko", "status": "Pending" },
          { "id": 2, "name": null, "category": "private",
            "insurance_type": "Vollkasko", "status": "Pending" },
        ]))
      }),
    )
    .with_state(hits.clone());
  let base = serve(router).await;
  let client = ApiClient::new(ApiConfig {
    base_url:     base,
    database_url: None,
    database_key: None,
  })
  .unwrap();

  let mut app = App::with_options(
    client,
    6,
    QueryOptions {
      retry: instant(3),
      ..QueryOptions::default()
    },
    instant_mutations(),
  )
  .unwrap();
  let cmd = app.mount();
  assert_eq!(cmd, Command::FetchApplications);
  assert!(app.run(cmd).await);

  match app.application_render() {
    TableRender::Loaded(page) => assert!(page.rows.is_empty()),
    other => panic!("expected an empty table, got {other:?}"),
  }
  assert!(app.applications.error.is_none());
  assert_eq!(hits.load(Ordering::SeqCst), 1);
}

// ─── Status updates ───────────────────────────────────────────────────────────

#[tokio::test]
async fn application_status_is_patched_by_application_id() {
  let (client, seen) = setup().await;
  let status = client
    .update_application_status(12, ApplicationStatus::Declined)
    .await
    .unwrap();
  assert_eq!(status, ApplicationStatus::Declined);

  let seen = seen.lock().unwrap();
  assert_eq!(seen.len(), 1);
  let patch = &seen[0];
  assert_eq!(patch.table, "applications");
  assert_eq!(patch.query.get("application_id").map(String::as_str), Some("eq.12"));
  assert_eq!(patch.apikey.as_deref(), Some("anon-key"));
  assert_eq!(patch.authorization.as_deref(), Some("Bearer anon-key"));
  assert_eq!(patch.body, json!({ "status": "Declined" }));
}

#[tokio::test]
async fn claim_status_is_patched_by_id() {
  let (client, seen) = setup().await;
  client
    .update_claim_status(5, ClaimStatus::ReviewRequired)
    .await
    .unwrap();

  let seen = seen.lock().unwrap();
  let patch = &seen[0];
  assert_eq!(patch.table, "claims");
  assert_eq!(patch.query.get("id").map(String::as_str), Some("eq.5"));
  assert_eq!(patch.body, json!({ "approval_status": "Review Required" }));
}

#[tokio::test]
async fn rejected_update_carries_database_message() {
  let base = serve(Router::new().route("/rest/v1/{table}", patch(reject_patch))).await;
  let client = ApiClient::new(ApiConfig {
    base_url:     base.clone(),
    database_url: Some(base),
    database_key: Some("anon-key".to_string()),
  })
  .unwrap();

  let err = client
    .update_application_status(1, ApplicationStatus::Approved)
    .await
    .unwrap_err();
  assert_eq!(
    err.to_string(),
    "Failed to update application status: permission denied for table applications"
  );
}

#[tokio::test]
async fn update_without_database_fails() {
  let client = ApiClient::new(ApiConfig {
    base_url:     "http://127.0.0.1:9".to_string(),
    database_url: None,
    database_key: None,
  })
  .unwrap();

  let err = client
    .update_claim_status(1, ClaimStatus::Approved)
    .await
    .unwrap_err();
  assert!(
    err
      .to_string()
      .starts_with("Failed to update claim status:")
  );
}
