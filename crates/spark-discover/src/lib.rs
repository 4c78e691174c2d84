//! The discover feed: a shuffled queue of candidate profiles advanced by
//! swipe gestures.
//!
//! Everything here runs on one cooperative UI thread. Only data-source
//! fetches leave it, as tasks on the tokio runtime whose results are applied
//! back on the next [`screen::DiscoverScreen::tick`].

pub mod animated;
pub mod card;
pub mod error;
pub mod gesture;
pub mod queue;
pub mod screen;

pub use error::{GestureError, QueueError, RenderError};

#[cfg(test)]
mod testing;
