//! Core types for the Capitol back-office dashboard.
//!
//! No HTTP or terminal code lives here. The crate holds the wire and display
//! record shapes, the record normalizer with its status cache, the
//! render-agnostic table model, and the retry policy used by clients of the
//! external insurance API.

pub mod columns;
pub mod details;
pub mod error;
pub mod normalize;
pub mod record;
pub mod retry;
pub mod source;
pub mod table;

pub use error::{Error, Result};

#[cfg(test)]
mod tests;
