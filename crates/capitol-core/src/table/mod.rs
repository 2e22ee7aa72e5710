//! Render-agnostic tabular view: filter, sort and paginate typed rows under a
//! caller-supplied column schema.
//!
//! The view owns no data. Callers keep their rows and a [`ViewState`], feed
//! user interactions through [`reduce`], and ask [`TableView::render`] for the
//! page to draw.

mod cell;
mod column;
mod state;
mod view;

pub use cell::CellValue;
pub use column::{ColumnDef, ColumnId};
pub use state::{Pagination, SortDirection, SortSpec, TableEvent, ViewState, reduce};
pub use view::{
  DEFAULT_PAGE_SIZE, ERROR_MESSAGE, HeaderCell, LOADING_MESSAGE, RenderedRow, TablePage,
  TableRender, TableView,
};

/// A row that can be shown by a [`TableView`].
pub trait TableRow {
  /// Stable identity of the row, used to track it across re-renders.
  fn key(&self) -> String;
}
