//! Error types for `spark-discover`.
//!
//! Every variant is handled at the screen boundary: logged, surfaced in the
//! view, never propagated further.

use thiserror::Error;

/// The data source could not produce a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
  #[error("failed to load profiles: {0}")]
  Load(String),

  #[error("profile load was cancelled before it finished")]
  Cancelled,

  #[error("no async runtime available to load profiles")]
  NoRuntime,
}

/// A gesture could not be interpreted; the card is returned to neutral.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GestureError {
  #[error("release without a drag in progress")]
  NotDragging,

  #[error("non-finite drag input ({0}, {1})")]
  NonFiniteInput(f32, f32),

  #[error("viewport width must be positive, got {0}")]
  InvalidViewport(f32),
}

/// A candidate record could not be turned into a card.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
  #[error("invalid colour {value:?} in {field}")]
  InvalidColor { field: &'static str, value: String },
}
