//! Column schemas for the application and claim lists.

use crate::{
  Result,
  record::{ApplicationRecord, RawClaim},
  table::{CellValue, ColumnDef, TableView},
};

pub const APPLICATION_SEARCH_COLUMN: &str = "applicantName";
pub const CLAIM_SEARCH_COLUMN: &str = "applicant_name";

/// Columns of the insurance application list, left to right.
pub fn application_columns() -> Vec<ColumnDef<ApplicationRecord>> {
  vec![
    ColumnDef::new("id", "ID", |r: &ApplicationRecord| numeric_text(&r.id)).sortable(),
    ColumnDef::new(APPLICATION_SEARCH_COLUMN, "Applicant Name", |r: &ApplicationRecord| {
      CellValue::from(r.applicant_name.as_str())
    })
    .sortable()
    .cell(capitalize),
    ColumnDef::new("typeOfCustomer", "Category", |r: &ApplicationRecord| {
      CellValue::from(r.type_of_customer.as_str())
    })
    .sortable()
    .cell(capitalize),
    ColumnDef::new("insuranceType", "Insurance Type", |r: &ApplicationRecord| {
      CellValue::from(r.insurance_type.as_str())
    })
    .sortable(),
    ColumnDef::new("requestedDate", "Requested", |r: &ApplicationRecord| {
      CellValue::from(r.requested_date)
    })
    .sortable(),
    ColumnDef::new("amount", "Amount", |r: &ApplicationRecord| CellValue::from(r.amount))
      .sortable()
      .cell(euro),
    ColumnDef::new("status", "Status", |r: &ApplicationRecord| {
      CellValue::from(r.status.as_str())
    })
    .sortable(),
  ]
}

/// Columns of the claim list, left to right.
pub fn claim_columns() -> Vec<ColumnDef<RawClaim>> {
  vec![
    ColumnDef::new("claim_id", "ID", |c: &RawClaim| CellValue::from(c.claim_id)).sortable(),
    ColumnDef::new(CLAIM_SEARCH_COLUMN, "Applicant Name", |c: &RawClaim| {
      CellValue::from(c.applicant_name.as_str())
    })
    .sortable()
    .cell(capitalize),
    ColumnDef::new("claim_type", "Claim Type", |c: &RawClaim| {
      CellValue::from(c.claim_type.as_str())
    })
    .sortable()
    .cell(capitalize),
    ColumnDef::new("insurance_type", "Insurance Type", |c: &RawClaim| {
      CellValue::from(c.insurance_type.as_str())
    })
    .sortable()
    .cell(capitalize),
    ColumnDef::new("approval_status", "Status", |c: &RawClaim| {
      CellValue::from(c.status_label())
    })
    .sortable(),
  ]
}

/// Application list searchable by applicant name.
pub fn application_view(page_size: usize) -> Result<TableView<ApplicationRecord>> {
  TableView::new(application_columns())
    .with_search_column(APPLICATION_SEARCH_COLUMN)
    .with_page_size(page_size)
}

/// Claim list searchable by applicant name.
pub fn claim_view(page_size: usize) -> Result<TableView<RawClaim>> {
  TableView::new(claim_columns())
    .with_search_column(CLAIM_SEARCH_COLUMN)
    .with_page_size(page_size)
}

// ─── Cell renderers ──────────────────────────────────────────────────────────

/// Ids arrive as strings; order them numerically when they parse.
fn numeric_text(id: &str) -> CellValue {
  id.parse::<i64>()
    .map_or_else(|_| CellValue::from(id), CellValue::Integer)
}

/// Upper-case the first letter of every word; `natural_disaster` stays one
/// word.
fn capitalize(value: &CellValue) -> String {
  value
    .to_string()
    .split(' ')
    .map(|word| {
      let mut chars = word.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}

fn euro(value: &CellValue) -> String {
  match value {
    CellValue::Number(n) => format!("€{n:.2}"),
    CellValue::Integer(n) => format!("€{n}.00"),
    other => other.to_string(),
  }
}
