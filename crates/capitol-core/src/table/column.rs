//! Column definitions.

use std::fmt;

use super::CellValue;

/// Identifier of a column within a [`TableView`](super::TableView).
pub type ColumnId = &'static str;

/// Schema entry mapping a row field to a header and a cell rendering.
///
/// Accessors and renderers are plain function pointers: pure, and cheap to
/// copy into every view that shows the same rows.
pub struct ColumnDef<T> {
  pub id:       ColumnId,
  pub header:   &'static str,
  pub accessor: fn(&T) -> CellValue,
  /// Display override; the value's `Display` is used when unset.
  pub cell:     Option<fn(&CellValue) -> String>,
  pub sortable: bool,
}

impl<T> ColumnDef<T> {
  pub fn new(id: ColumnId, header: &'static str, accessor: fn(&T) -> CellValue) -> Self {
    Self {
      id,
      header,
      accessor,
      cell: None,
      sortable: false,
    }
  }

  pub fn sortable(mut self) -> Self {
    self.sortable = true;
    self
  }

  pub fn cell(mut self, render: fn(&CellValue) -> String) -> Self {
    self.cell = Some(render);
    self
  }

  pub fn value(&self, row: &T) -> CellValue { (self.accessor)(row) }

  /// The display fragment for this column of `row`.
  pub fn render(&self, row: &T) -> String {
    let value = self.value(row);
    match self.cell {
      Some(render) => render(&value),
      None => value.to_string(),
    }
  }
}

impl<T> Clone for ColumnDef<T> {
  fn clone(&self) -> Self {
    Self {
      id:       self.id,
      header:   self.header,
      accessor: self.accessor,
      cell:     self.cell,
      sortable: self.sortable,
    }
  }
}

impl<T> fmt::Debug for ColumnDef<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ColumnDef")
      .field("id", &self.id)
      .field("header", &self.header)
      .field("sortable", &self.sortable)
      .finish_non_exhaustive()
  }
}
