//! Error type for `spark-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] spark_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("stored profile {0} is not a JSON object")]
  CorruptProfile(String),

  #[error("import must be a JSON array of profile objects")]
  NotAnArray,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
