//! View state and its reducer.
//!
//! [`reduce`] is the only way the state changes. It performs no I/O and never
//! touches the rows or columns it is given, so every interaction can be
//! replayed in a test.

use std::collections::BTreeMap;

use super::{ColumnDef, ColumnId, view::filtered_rows};
use crate::{Error, Result};

// ─── Sorting ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
  Asc,
  Desc,
}

impl SortDirection {
  pub fn flip(self) -> Self {
    match self {
      Self::Asc => Self::Desc,
      Self::Desc => Self::Asc,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
  pub column:    ColumnId,
  pub direction: SortDirection,
}

// ─── Pagination ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
  pub page_index: usize,
  /// Always greater than zero.
  pub page_size:  usize,
}

impl Pagination {
  /// Number of pages needed for `row_count` rows; zero when there are none.
  pub fn page_count(&self, row_count: usize) -> usize { row_count.div_ceil(self.page_size) }

  fn reset_if_out_of_range(&mut self, row_count: usize) {
    if self.page_index >= self.page_count(row_count) {
      self.page_index = 0;
    }
  }
}

// ─── State ───────────────────────────────────────────────────────────────────

/// Interaction state of one table: sort sequence, per-column filters, and
/// the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
  /// Applied in order; later entries break ties of earlier ones.
  pub sorting:    Vec<SortSpec>,
  /// Column id to filter text. Empty filters are never stored.
  pub filters:    BTreeMap<ColumnId, String>,
  pub pagination: Pagination,
}

impl ViewState {
  pub fn new(page_size: usize) -> Result<Self> {
    if page_size == 0 {
      return Err(Error::InvalidPageSize);
    }
    Ok(Self {
      sorting:    Vec::new(),
      filters:    BTreeMap::new(),
      pagination: Pagination {
        page_index: 0,
        page_size,
      },
    })
  }

  pub fn direction_of(&self, column: &str) -> Option<SortDirection> {
    self
      .sorting
      .iter()
      .find(|s| s.column == column)
      .map(|s| s.direction)
  }

  pub fn filter(&self, column: &str) -> Option<&str> { self.filters.get(column).map(String::as_str) }
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
  /// Sort by `column`, ascending first, flipping on each repeat. With
  /// `multi` the column is added to (or flipped within) the existing sort
  /// sequence; without it the sequence is replaced.
  ToggleSort { column: ColumnId, multi: bool },
  ClearSort,
  /// Set the free-text filter for `column`; an empty value removes it.
  SetFilter { column: ColumnId, value: String },
  ClearFilters,
  NextPage,
  PreviousPage,
  FirstPage,
  LastPage,
  /// Change the page size, keeping the first visible row on screen.
  /// Zero is ignored.
  SetPageSize(usize),
  /// The caller's row sequence changed; re-check the page index.
  RowsChanged,
}

/// Apply `event` to `state`.
///
/// After every event the page index is reset to zero if it no longer points
/// at an existing page of the filtered rows.
pub fn reduce<T>(
  mut state: ViewState,
  event: TableEvent,
  rows: &[T],
  columns: &[ColumnDef<T>],
) -> ViewState {
  tracing::debug!(?event, "table event");

  match event {
    TableEvent::ToggleSort { column, multi } => {
      let Some(def) = columns.iter().find(|c| c.id == column) else {
        return state;
      };
      if !def.sortable {
        return state;
      }
      let direction = state
        .direction_of(column)
        .map_or(SortDirection::Asc, SortDirection::flip);
      if !multi {
        state.sorting = vec![SortSpec { column, direction }];
      } else if let Some(spec) = state.sorting.iter_mut().find(|s| s.column == column) {
        spec.direction = direction;
      } else {
        state.sorting.push(SortSpec { column, direction });
      }
    }
    TableEvent::ClearSort => state.sorting.clear(),
    TableEvent::SetFilter { column, value } => {
      if !columns.iter().any(|c| c.id == column) {
        return state;
      }
      if value.is_empty() {
        state.filters.remove(column);
      } else {
        state.filters.insert(column, value);
      }
    }
    TableEvent::ClearFilters => state.filters.clear(),
    TableEvent::NextPage => {
      let page_count = state
        .pagination
        .page_count(filtered_rows(&state, rows, columns).len());
      if state.pagination.page_index + 1 < page_count {
        state.pagination.page_index += 1;
      }
    }
    TableEvent::PreviousPage => {
      state.pagination.page_index = state.pagination.page_index.saturating_sub(1);
    }
    TableEvent::FirstPage => state.pagination.page_index = 0,
    TableEvent::LastPage => {
      let page_count = state
        .pagination
        .page_count(filtered_rows(&state, rows, columns).len());
      state.pagination.page_index = page_count.saturating_sub(1);
    }
    TableEvent::SetPageSize(size) => {
      if size > 0 {
        let first_row = state.pagination.page_index * state.pagination.page_size;
        state.pagination = Pagination {
          page_index: first_row / size,
          page_size:  size,
        };
      }
    }
    TableEvent::RowsChanged => {}
  }

  let filtered = filtered_rows(&state, rows, columns).len();
  state.pagination.reset_if_out_of_range(filtered);
  state
}
