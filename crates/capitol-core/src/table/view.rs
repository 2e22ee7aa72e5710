//! [`TableView`] — the render pipeline (filter → sort → paginate) and the
//! loading/error/loaded presentation states.

use std::cmp::Ordering;

use super::{ColumnDef, ColumnId, SortDirection, TableEvent, TableRow, ViewState, reduce};
use crate::{Error, Result};

pub const DEFAULT_PAGE_SIZE: usize = 6;
pub const LOADING_MESSAGE: &str = "Loading data...";
pub const ERROR_MESSAGE: &str = "Error loading data. Please try again later.";

// ─── Render output ───────────────────────────────────────────────────────────

/// What a table shows. Exactly one state is presented at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRender {
  Loading,
  /// Every kind of failure renders the same placeholder.
  Error,
  Loaded(TablePage),
}

impl TableRender {
  /// Placeholder text for the non-table states.
  pub fn placeholder(&self) -> Option<&'static str> {
    match self {
      Self::Loading => Some(LOADING_MESSAGE),
      Self::Error => Some(ERROR_MESSAGE),
      Self::Loaded(_) => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
  pub id:        ColumnId,
  pub label:     &'static str,
  pub sortable:  bool,
  pub direction: Option<SortDirection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
  /// Position of the row in the caller's sequence.
  pub index: usize,
  pub key:   String,
  pub cells: Vec<String>,
}

/// One page of filtered, sorted rows plus navigation affordances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePage {
  pub headers:        Vec<HeaderCell>,
  pub rows:           Vec<RenderedRow>,
  pub page_index:     usize,
  pub page_count:     usize,
  pub filtered_count: usize,
  pub total_count:    usize,
  pub can_previous:   bool,
  pub can_next:       bool,
  /// Current text of the search column's filter, if one is designated.
  pub search:         Option<String>,
}

impl TablePage {
  /// e.g. `"Showing 2 of 3 pages"`.
  pub fn summary(&self) -> String {
    format!("Showing {} of {} pages", self.page_index + 1, self.page_count)
  }
}

// ─── View ────────────────────────────────────────────────────────────────────

/// A reusable table over rows of type `T`.
#[derive(Debug, Clone)]
pub struct TableView<T> {
  columns:       Vec<ColumnDef<T>>,
  search_column: Option<ColumnId>,
  page_size:     usize,
}

impl<T: TableRow> TableView<T> {
  pub fn new(columns: Vec<ColumnDef<T>>) -> Self {
    Self {
      columns,
      search_column: None,
      page_size: DEFAULT_PAGE_SIZE,
    }
  }

  /// Designate the column that free-text search filters on.
  pub fn with_search_column(mut self, column: ColumnId) -> Self {
    self.search_column = Some(column);
    self
  }

  pub fn with_page_size(mut self, page_size: usize) -> Result<Self> {
    if page_size == 0 {
      return Err(Error::InvalidPageSize);
    }
    self.page_size = page_size;
    Ok(self)
  }

  pub fn columns(&self) -> &[ColumnDef<T>] { &self.columns }

  pub fn search_column(&self) -> Option<ColumnId> { self.search_column }

  pub fn page_size(&self) -> usize { self.page_size }

  /// Fresh state: unsorted, unfiltered, first page.
  pub fn initial_state(&self) -> ViewState {
    ViewState {
      sorting:    Vec::new(),
      filters:    Default::default(),
      pagination: super::Pagination {
        page_index: 0,
        page_size:  self.page_size,
      },
    }
  }

  pub fn reduce(&self, state: ViewState, event: TableEvent, rows: &[T]) -> ViewState {
    reduce(state, event, rows, &self.columns)
  }

  /// Set the search text; a no-op when no search column is designated.
  pub fn search(&self, state: ViewState, text: impl Into<String>, rows: &[T]) -> ViewState {
    match self.search_column {
      Some(column) => self.reduce(
        state,
        TableEvent::SetFilter {
          column,
          value: text.into(),
        },
        rows,
      ),
      None => state,
    }
  }

  /// Present `rows` under `state`.
  ///
  /// Loading wins over error, and error wins over rows; the losing inputs
  /// are ignored.
  pub fn render<E: ?Sized>(
    &self,
    rows: &[T],
    state: &ViewState,
    is_loading: bool,
    error: Option<&E>,
  ) -> TableRender {
    if is_loading {
      TableRender::Loading
    } else if error.is_some() {
      TableRender::Error
    } else {
      TableRender::Loaded(self.page(rows, state))
    }
  }

  /// The current page of `rows` under `state`.
  pub fn page(&self, rows: &[T], state: &ViewState) -> TablePage {
    let mut visible = filtered_rows(state, rows, &self.columns);
    sort_rows(&mut visible, state, &self.columns);

    let filtered_count = visible.len();
    let page_size = state.pagination.page_size.max(1);
    let page_count = filtered_count.div_ceil(page_size);
    let page_index = if state.pagination.page_index < page_count {
      state.pagination.page_index
    } else {
      0
    };

    let page_rows = visible
      .into_iter()
      .skip(page_index * page_size)
      .take(page_size)
      .map(|(index, row)| RenderedRow {
        index,
        key: row.key(),
        cells: self.columns.iter().map(|c| c.render(row)).collect(),
      })
      .collect();

    let headers = self
      .columns
      .iter()
      .map(|c| HeaderCell {
        id:        c.id,
        label:     c.header,
        sortable:  c.sortable,
        direction: state.direction_of(c.id),
      })
      .collect();

    TablePage {
      headers,
      rows: page_rows,
      page_index,
      page_count,
      filtered_count,
      total_count: rows.len(),
      can_previous: page_index > 0,
      can_next: page_index + 1 < page_count,
      search: self
        .search_column
        .and_then(|id| state.filter(id))
        .map(str::to_owned),
    }
  }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Rows passing every filter, paired with their input position.
///
/// Filters on columns absent from `columns` are ignored.
pub(super) fn filtered_rows<'a, T>(
  state: &ViewState,
  rows: &'a [T],
  columns: &[ColumnDef<T>],
) -> Vec<(usize, &'a T)> {
  let active: Vec<(&ColumnDef<T>, &str)> = state
    .filters
    .iter()
    .filter_map(|(id, text)| {
      columns
        .iter()
        .find(|c| c.id == *id)
        .map(|c| (c, text.as_str()))
    })
    .collect();

  rows
    .iter()
    .enumerate()
    .filter(|(_, row)| {
      active
        .iter()
        .all(|(column, text)| column.value(row).contains_text(text))
    })
    .collect()
}

/// Stable multi-key sort. Empty values sort last regardless of direction.
///
/// Full ties keep input order in both directions, so descending is the exact
/// reverse of ascending only when the sort keys are distinct. On columns with
/// repeated values, rows within a tie group read in the same order either way.
fn sort_rows<T>(visible: &mut [(usize, &T)], state: &ViewState, columns: &[ColumnDef<T>]) {
  let keys: Vec<(&ColumnDef<T>, SortDirection)> = state
    .sorting
    .iter()
    .filter_map(|s| {
      columns
        .iter()
        .find(|c| c.id == s.column)
        .map(|c| (c, s.direction))
    })
    .collect();
  if keys.is_empty() {
    return;
  }

  visible.sort_by(|(left_index, left), (right_index, right)| {
    for (column, direction) in &keys {
      let left_value = column.value(left);
      let right_value = column.value(right);
      match (left_value.is_empty(), right_value.is_empty()) {
        (true, true) => continue,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
      }
      let order = match direction {
        SortDirection::Asc => left_value.cmp_value(&right_value),
        SortDirection::Desc => left_value.cmp_value(&right_value).reverse(),
      };
      if order != Ordering::Equal {
        return order;
      }
    }
    left_index.cmp(right_index)
  });
}
