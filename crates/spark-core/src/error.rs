//! Error types for `spark-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("profile record has no usable id")]
  MissingId,

  #[error("profile record {0:?} is not a JSON object")]
  NotAnObject(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

/// Why a birth date could not be turned into an age.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgeError {
  #[error("birth date is empty")]
  Empty,

  #[error("unrecognised birth date: {0:?}")]
  Unparseable(String),

  #[error("birth date lies in the future")]
  InTheFuture,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
