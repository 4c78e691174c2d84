//! [`DiscoverScreen`] — the controller behind the discover feed.
//!
//! Owns the screen's [`ProfileQueue`] and the [`SwipeInterpreter`] for the
//! card on display. The host calls the pointer methods as input arrives and
//! [`DiscoverScreen::tick`] once per frame; dropping the screen unmounts it,
//! cancelling any fetch still in flight.

use std::time::Instant;

use chrono::NaiveDate;
use spark_core::source::ProfileSource;
use tracing::{debug, info, warn};

use crate::{
  card::{CardView, ErrorCard, check_renderable},
  gesture::{Offset, SwipeDirection, SwipeInterpreter, SwipeOutcome, SwipePhase},
  queue::{Advance, ProfileQueue, QueueStatus},
};

/// What the screen should draw this frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoverView {
  Loading,
  Card {
    card:   CardView,
    offset: Offset,
    scale:  f32,
  },
  /// Every candidate has been seen; offer a manual reload.
  Exhausted,
  LoadFailed(ErrorCard),
  RenderFailed(ErrorCard),
}

pub struct DiscoverScreen<S: ProfileSource + 'static> {
  queue:         ProfileQueue<S>,
  swipe:         SwipeInterpreter,
  /// Pointer position at press; moves are measured from here.
  pointer_start: Option<(f32, f32)>,
}

impl<S: ProfileSource + 'static> DiscoverScreen<S> {
  /// Mount the screen and start the first load.
  pub fn mount(mut queue: ProfileQueue<S>, viewport_width: f32) -> Self {
    if queue.status() == QueueStatus::Idle {
      queue.request_load();
    }
    Self {
      queue,
      swipe: SwipeInterpreter::new(viewport_width),
      pointer_start: None,
    }
  }

  pub fn queue(&self) -> &ProfileQueue<S> { &self.queue }

  pub fn swipe(&self) -> &SwipeInterpreter { &self.swipe }

  pub fn resize(&mut self, viewport_width: f32) { self.swipe.set_viewport_width(viewport_width); }

  // ── Input ─────────────────────────────────────────────────────────────────

  /// Gestures act only on a card that is actually drawn, and not while a
  /// new batch is on its way.
  fn accepts_gestures(&self) -> bool {
    !self.queue.is_loading() && self.queue.current().is_some_and(|c| check_renderable(c).is_ok())
  }

  pub fn pointer_down(&mut self, x: f32, y: f32, now: Instant) {
    if !self.accepts_gestures() {
      return;
    }
    if self.swipe.begin(now) {
      self.pointer_start = Some((x, y));
    }
  }

  pub fn pointer_move(&mut self, x: f32, y: f32, now: Instant) {
    let Some((x0, y0)) = self.pointer_start else {
      return;
    };
    if let Err(e) = self.swipe.drag(Offset::new(x - x0, y - y0), now) {
      warn!("drag rejected: {e}");
      self.pointer_start = None;
    }
  }

  pub fn pointer_up(&mut self, now: Instant) -> Option<SwipeOutcome> {
    self.pointer_start.take()?;
    match self.swipe.release(now) {
      Ok(outcome) => Some(outcome),
      Err(e) => {
        warn!("swipe treated as cancelled: {e}");
        None
      }
    }
  }

  /// Keyboard swipe: a full drag past the threshold and release.
  pub fn swipe_card(&mut self, direction: SwipeDirection, now: Instant) -> Option<SwipeOutcome> {
    if !self.accepts_gestures() {
      return None;
    }
    self.pointer_start = None;
    match self.swipe.fling(direction, now) {
      Ok(outcome) => Some(outcome),
      Err(e) => {
        warn!("swipe ignored: {e}");
        None
      }
    }
  }

  /// Manual reload from the exhausted or error states.
  pub fn retry(&mut self) -> bool {
    self.swipe.reset();
    self.pointer_start = None;
    self.queue.request_load()
  }

  // ── Frame ─────────────────────────────────────────────────────────────────

  /// Apply any finished load, and advance the queue once a committed swipe
  /// has finished animating.
  pub fn tick(&mut self, now: Instant) -> Option<Advance> {
    if let Some(Ok(count)) = self.queue.poll_load() {
      self.refreshed(count);
    }

    let SwipeOutcome::Commit(direction) = self.swipe.tick(now)? else {
      return None;
    };
    if let Some(c) = self.queue.current() {
      info!(profile = %c.id, ?direction, "swiped");
    }
    Some(self.queue.advance())
  }

  /// Await the in-flight load, if any, and apply it.
  pub async fn wait_for_load(&mut self) {
    if let Some(Ok(count)) = self.queue.wait_for_load().await {
      self.refreshed(count);
    }
  }

  /// A new batch replaced the queue. A card still flying out belonged to the
  /// old batch, so its swipe must not advance the new one.
  fn refreshed(&mut self, count: usize) {
    info!(count, "feed refreshed");
    if matches!(
      self.swipe.phase(),
      SwipePhase::Settling { outcome: SwipeOutcome::Commit(_), .. }
    ) {
      debug!("dropping swipe that settled into a new batch");
      self.swipe.reset();
    }
  }

  pub fn view(&self, now: Instant, today: NaiveDate) -> DiscoverView {
    match self.queue.status() {
      QueueStatus::Ready => {
        let Some(candidate) = self.queue.current() else {
          return DiscoverView::Loading;
        };
        match CardView::build(candidate, today) {
          Ok(card) => DiscoverView::Card {
            card,
            offset: self.swipe.offset(now),
            scale: self.swipe.scale(now),
          },
          Err(e) => DiscoverView::RenderFailed(ErrorCard::new(e.to_string())),
        }
      }
      QueueStatus::Idle | QueueStatus::Loading => DiscoverView::Loading,
      QueueStatus::Exhausted => DiscoverView::Exhausted,
      QueueStatus::Failed(message) => DiscoverView::LoadFailed(ErrorCard::new(message)),
    }
  }
}
