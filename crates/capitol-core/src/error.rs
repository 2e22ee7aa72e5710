//! Error types for `capitol-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{kind} not found: {id}")]
  NotFound { kind: &'static str, id: String },

  #[error("cannot normalize record {id}: {reason}")]
  Transform { id: String, reason: String },

  #[error("page size must be greater than zero")]
  InvalidPageSize,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
