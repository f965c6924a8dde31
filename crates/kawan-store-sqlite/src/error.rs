//! Error type for `kawan-store-sqlite`.

use kawan_core::error::AsDomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain-rule violation from the core taxonomy (conflict, not-found,
  /// forbidden transition, ...).
  #[error(transparent)]
  Domain(#[from] kawan_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored enum column held an unknown value.
  #[error("decode error: {0}")]
  Decode(String),
}

impl AsDomainError for Error {
  fn as_domain(&self) -> Option<&kawan_core::Error> {
    match self {
      Error::Domain(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
