//! Typed cell values and their ordering.

use std::{cmp::Ordering, fmt};

use chrono::NaiveDate;

/// The value a column accessor extracts from a row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
  Empty,
  Text(String),
  Integer(i64),
  Number(f64),
  Date(NaiveDate),
}

impl CellValue {
  pub fn is_empty(&self) -> bool {
    match self {
      Self::Empty => true,
      Self::Text(s) => s.is_empty(),
      _ => false,
    }
  }

  /// Total order between two values.
  ///
  /// Text compares case-insensitively first, then by byte order so distinct
  /// strings never tie. Integers and numbers compare numerically with each
  /// other. Values of unrelated kinds order by kind.
  pub fn cmp_value(&self, other: &Self) -> Ordering {
    match (self, other) {
      (Self::Text(a), Self::Text(b)) => a
        .to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b)),
      (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
      (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
      (Self::Integer(a), Self::Number(b)) => (*a as f64).total_cmp(b),
      (Self::Number(a), Self::Integer(b)) => a.total_cmp(&(*b as f64)),
      (Self::Date(a), Self::Date(b)) => a.cmp(b),
      _ => self.rank().cmp(&other.rank()),
    }
  }

  /// Case-insensitive substring test against the textual rendering.
  pub fn contains_text(&self, needle: &str) -> bool {
    self
      .to_string()
      .to_lowercase()
      .contains(&needle.to_lowercase())
  }

  fn rank(&self) -> u8 {
    match self {
      Self::Integer(_) | Self::Number(_) => 0,
      Self::Date(_) => 1,
      Self::Text(_) => 2,
      Self::Empty => 3,
    }
  }
}

impl fmt::Display for CellValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Empty => Ok(()),
      Self::Text(s) => f.write_str(s),
      Self::Integer(n) => write!(f, "{n}"),
      Self::Number(n) => write!(f, "{n}"),
      Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
    }
  }
}

impl From<String> for CellValue {
  fn from(s: String) -> Self { Self::Text(s) }
}

impl From<&str> for CellValue {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<i64> for CellValue {
  fn from(n: i64) -> Self { Self::Integer(n) }
}

impl From<u64> for CellValue {
  fn from(n: u64) -> Self {
    i64::try_from(n).map_or_else(|_| Self::Text(n.to_string()), Self::Integer)
  }
}

impl From<f64> for CellValue {
  fn from(n: f64) -> Self { Self::Number(n) }
}

impl From<NaiveDate> for CellValue {
  fn from(d: NaiveDate) -> Self { Self::Date(d) }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
  fn from(v: Option<T>) -> Self { v.map_or(Self::Empty, Into::into) }
}
