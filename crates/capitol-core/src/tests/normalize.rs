use chrono::NaiveDate;
use serde_json::json;

use super::{ScriptedRng, raw, today};
use crate::{
  Error,
  normalize::{AMOUNT_CEILING, AMOUNT_FLOOR, Normalizer, StatusCache, decode, synthesize_amount},
  record::{ApplicationStatus, CustomerCategory, InsuranceType},
};

fn normalizer(values: &[u32]) -> Normalizer<ScriptedRng> {
  Normalizer::with_rng(ScriptedRng::new(values), today())
}

// ─── Sticky status ───────────────────────────────────────────────────────────

#[test]
fn first_observed_status_wins() {
  let mut cache = StatusCache::new();
  let mut n = normalizer(&[0]);

  let first = n
    .normalize(&[raw(7, "A", ApplicationStatus::Pending)], &mut cache)
    .unwrap();
  assert_eq!(first[0].status, ApplicationStatus::Pending);

  let second = n
    .normalize(&[raw(7, "A", ApplicationStatus::Approved)], &mut cache)
    .unwrap();
  assert_eq!(second[0].id, "7");
  assert_eq!(second[0].status, ApplicationStatus::Pending);
}

#[test]
fn invalidated_status_is_recorded_again() {
  let mut cache = StatusCache::new();
  let mut n = normalizer(&[0]);

  n.normalize(&[raw(7, "A", ApplicationStatus::Pending)], &mut cache)
    .unwrap();
  assert_eq!(cache.invalidate("7"), Some(ApplicationStatus::Pending));

  let again = n
    .normalize(&[raw(7, "A", ApplicationStatus::Approved)], &mut cache)
    .unwrap();
  assert_eq!(again[0].status, ApplicationStatus::Approved);
}

#[test]
fn separate_caches_do_not_share_statuses() {
  let mut left = StatusCache::new();
  let mut right = StatusCache::new();
  let mut n = normalizer(&[0]);

  n.normalize(&[raw(1, "A", ApplicationStatus::Declined)], &mut left)
    .unwrap();
  let other = n
    .normalize(&[raw(1, "A", ApplicationStatus::Approved)], &mut right)
    .unwrap();

  assert_eq!(other[0].status, ApplicationStatus::Approved);
  assert_eq!(left.get("1"), Some(ApplicationStatus::Declined));
}

#[test]
fn clearing_the_cache_forgets_everything() {
  let mut cache = StatusCache::new();
  cache.resolve("1", ApplicationStatus::Pending);
  cache.resolve("2", ApplicationStatus::Declined);
  assert_eq!(cache.len(), 2);

  cache.clear();
  assert!(cache.is_empty());
  assert_eq!(cache.get("1"), None);
}

// ─── Derived fields ──────────────────────────────────────────────────────────

#[test]
fn fleet_category_is_case_insensitive() {
  for category in ["fleet", "Fleet", "FLEET", " fleet "] {
    assert_eq!(CustomerCategory::from_raw(category), CustomerCategory::Fleet);
  }
  for category in ["private", "Private", "business", ""] {
    assert_eq!(CustomerCategory::from_raw(category), CustomerCategory::Private);
  }
}

#[test]
fn synthesized_amount_grows_with_age_and_is_clamped() {
  assert_eq!(synthesize_amount(0), 200.0);
  assert_eq!(synthesize_amount(5), 216.0);
  assert_eq!(synthesize_amount(15), 250.0);
  assert_eq!(synthesize_amount(30), 300.0);
  assert_eq!(synthesize_amount(100_000), AMOUNT_CEILING);
}

#[test]
fn requested_date_and_amount_follow_the_drawn_offset() {
  let mut cache = StatusCache::new();
  let mut n = normalizer(&[5]);

  let records = n
    .normalize(&[raw(3, "B", ApplicationStatus::Pending)], &mut cache)
    .unwrap();

  assert_eq!(
    records[0].requested_date,
    NaiveDate::from_ymd_opt(2024, 6, 25).unwrap()
  );
  assert_eq!(records[0].amount, 216.0);
}

#[test]
fn drawn_offset_wraps_into_the_request_window() {
  let mut cache = StatusCache::new();
  let mut n = normalizer(&[31]);

  let records = n
    .normalize(&[raw(3, "B", ApplicationStatus::Pending)], &mut cache)
    .unwrap();

  assert_eq!(records[0].requested_date, today());
  assert_eq!(records[0].amount, AMOUNT_FLOOR);
}

#[test]
fn supplied_amount_passes_through() {
  let mut cache = StatusCache::new();
  let mut n = normalizer(&[12]);
  let mut item = raw(4, "C", ApplicationStatus::Approved);
  item.amount = Some(4_250.5);

  let records = n.normalize(&[item], &mut cache).unwrap();
  assert_eq!(records[0].amount, 4_250.5);
}

#[test]
fn unsupplied_amount_stays_in_bounds_across_calls() {
  let mut cache = StatusCache::new();
  let mut n = Normalizer::new();
  let batch = [raw(9, "D", ApplicationStatus::Pending)];

  for _ in 0..50 {
    let records = n.normalize(&batch, &mut cache).unwrap();
    let amount = records[0].amount;
    assert!(
      (AMOUNT_FLOOR..=AMOUNT_CEILING).contains(&amount),
      "amount {amount} out of bounds"
    );
  }
}

#[test]
fn batch_keeps_length_and_order() {
  let mut cache = StatusCache::new();
  let mut n = normalizer(&[1, 2, 3]);
  let batch = [
    raw(30, "Zed", ApplicationStatus::Pending),
    raw(10, "Amy", ApplicationStatus::Declined),
    raw(20, "Bob", ApplicationStatus::FurtherReviewRequired),
  ];

  let records = n.normalize(&batch, &mut cache).unwrap();
  let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
  assert_eq!(ids, ["30", "10", "20"]);
  assert_eq!(records[2].status, ApplicationStatus::FurtherReviewRequired);
  assert_eq!(records[1].insurance_type, InsuranceType::Vollkasko);
}

// ─── Failure policy ──────────────────────────────────────────────────────────

#[test]
fn invalid_amount_fails_the_whole_batch_without_touching_the_cache() {
  let mut cache = StatusCache::new();
  let mut n = normalizer(&[0]);
  let mut bad = raw(2, "Bad", ApplicationStatus::Approved);
  bad.amount = Some(f64::NAN);
  let batch = [raw(1, "Good", ApplicationStatus::Pending), bad];

  let err = n.normalize(&batch, &mut cache).unwrap_err();
  assert!(matches!(err, Error::Transform { ref id, .. } if id == "2"));
  assert!(cache.is_empty());
}

#[test]
fn normalize_or_empty_degrades_to_no_rows() {
  let mut cache = StatusCache::new();
  let mut n = normalizer(&[0]);
  let batch = [
    json!({ "id": 1, "name": "Good", "insurance_type": "Vollkasko", "status": "Pending" }),
    json!({ "id": 2, "name": "Bad", "insurance_type": "Vollkasko", "status": "Approved",
            "amount": -10.0 }),
  ];

  assert!(n.normalize_or_empty(&batch, &mut cache).is_empty());
  assert!(cache.is_empty());

  let fine = n.normalize_or_empty(&batch[..1], &mut cache);
  assert_eq!(fine.len(), 1);
}

#[test]
fn malformed_record_fails_the_batch_as_a_transform_error() {
  let mut cache = StatusCache::new();
  let mut n = normalizer(&[0]);
  let batch = [
    json!({ "id": 1, "name": "Anna Schmidt", "insurance_type": "Vollkasko",
            "status": "Pending" }),
    json!({ "id": 2, "name": null, "insurance_type": "Vollkasko", "status": "Pending" }),
  ];

  let err = n.normalize_values(&batch, &mut cache).unwrap_err();
  assert!(matches!(err, Error::Transform { ref id, .. } if id == "2"));
  assert!(cache.is_empty());
  assert!(n.normalize_or_empty(&batch, &mut cache).is_empty());
}

#[test]
fn unknown_status_or_insurance_type_is_malformed() {
  let unknown_status = json!({ "id": "3", "name": "A", "insurance_type": "Vollkasko",
                               "status": "Archived" });
  let unknown_type = json!({ "id": 4, "name": "B", "insurance_type": "Hausrat",
                             "status": "Pending" });
  let no_id = json!({ "name": "C", "insurance_type": "Vollkasko", "status": "Pending" });

  assert!(matches!(decode(&[unknown_status]), Err(Error::Transform { ref id, .. }) if id == "3"));
  assert!(matches!(decode(&[unknown_type]), Err(Error::Transform { ref id, .. }) if id == "4"));
  assert!(matches!(decode(&[no_id]), Err(Error::Transform { ref id, .. }) if id == "?"));
}

#[test]
fn decoded_values_normalize_like_typed_records() {
  let mut cache = StatusCache::new();
  let mut n = normalizer(&[0]);
  let batch = [json!({ "id": "7", "name": "anna schmidt", "category": "FLEET",
                       "insurance_type": "Haftpflicht", "status": "Approved" })];

  let records = n.normalize_values(&batch, &mut cache).unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].id, "7");
  assert_eq!(records[0].type_of_customer, CustomerCategory::Fleet);
  assert_eq!(records[0].insurance_type, InsuranceType::Haftpflicht);
  assert_eq!(cache.get("7"), Some(ApplicationStatus::Approved));
}
