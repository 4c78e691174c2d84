//! The swipe gesture interpreter.
//!
//! Turns a stream of pointer events (start, continuous translation, release)
//! into a commit-or-cancel decision and drives the card's offset and scale.
//! The decision is only reported from [`SwipeInterpreter::tick`] once the
//! resulting animation has settled, so the caller never swaps the card's
//! contents while it is still on its way out.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::{
  GestureError,
  animated::{AnimatedValue, Easing},
};

/// Fraction of the viewport width a card must travel to commit.
pub const COMMIT_FRACTION: f32 = 0.3;

/// Where a committed card flies to, in viewport widths from centre.
pub const EXIT_DISTANCE_FACTOR: f32 = 1.5;

/// Exit animation length; the queue advances once it has elapsed.
pub const EXIT_DURATION: Duration = Duration::from_millis(250);

/// Snap-back animation length after a cancelled drag.
pub const RETURN_DURATION: Duration = Duration::from_millis(200);

/// Cosmetic enlargement while a card is held.
pub const DRAG_SCALE: f32 = 1.05;

const SCALE_DURATION: Duration = Duration::from_millis(100);

// ─── Value types ─────────────────────────────────────────────────────────────

/// A 2D displacement in viewport units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
  pub x: f32,
  pub y: f32,
}

impl Offset {
  pub const ZERO: Offset = Offset { x: 0.0, y: 0.0 };

  pub fn new(x: f32, y: f32) -> Self { Self { x, y } }

  fn is_finite(self) -> bool { self.x.is_finite() && self.y.is_finite() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
  Left,
  Right,
}

impl SwipeDirection {
  fn sign(self) -> f32 {
    match self {
      SwipeDirection::Left => -1.0,
      SwipeDirection::Right => 1.0,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
  Commit(SwipeDirection),
  Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwipePhase {
  Idle,
  Dragging {
    /// Animated offset captured when the gesture began.
    origin:      Offset,
    /// Raw translation reported since the gesture began.
    translation: Offset,
  },
  Settling {
    outcome: SwipeOutcome,
    until:   Instant,
  },
}

// ─── Interpreter ─────────────────────────────────────────────────────────────

/// Owns the animated offset and scale of the card currently on screen.
#[derive(Debug, Clone)]
pub struct SwipeInterpreter {
  x:              AnimatedValue,
  y:              AnimatedValue,
  scale:          AnimatedValue,
  viewport_width: f32,
  phase:          SwipePhase,
}

impl SwipeInterpreter {
  pub fn new(viewport_width: f32) -> Self {
    Self {
      x: AnimatedValue::new(0.0),
      y: AnimatedValue::new(0.0),
      scale: AnimatedValue::new(1.0),
      viewport_width,
      phase: SwipePhase::Idle,
    }
  }

  pub fn set_viewport_width(&mut self, width: f32) { self.viewport_width = width; }

  pub fn viewport_width(&self) -> f32 { self.viewport_width }

  /// Horizontal distance a release must exceed to commit.
  pub fn threshold(&self) -> f32 { self.viewport_width * COMMIT_FRACTION }

  pub fn phase(&self) -> SwipePhase { self.phase }

  pub fn offset(&self, now: Instant) -> Offset {
    Offset::new(self.x.value_at(now), self.y.value_at(now))
  }

  pub fn scale(&self, now: Instant) -> f32 { self.scale.value_at(now) }

  // ── Pointer events ────────────────────────────────────────────────────────

  /// Start a gesture, capturing the current animated offset as its origin.
  ///
  /// Returns `false` if the card is already leaving and cannot be grabbed.
  pub fn begin(&mut self, now: Instant) -> bool {
    match self.phase {
      SwipePhase::Settling { outcome: SwipeOutcome::Commit(_), .. } => {
        debug!("card is leaving; ignoring grab");
        false
      }
      SwipePhase::Dragging { .. } => true,
      SwipePhase::Idle | SwipePhase::Settling { .. } => {
        let origin = self.offset(now);
        self.x.set(origin.x);
        self.y.set(origin.y);
        self.scale.animate_to(DRAG_SCALE, SCALE_DURATION, Easing::EaseOutCubic, now);
        self.phase = SwipePhase::Dragging { origin, translation: Offset::ZERO };
        true
      }
    }
  }

  /// Apply the cumulative translation since [`begin`](Self::begin). Starts a
  /// gesture implicitly if none is in progress.
  pub fn drag(&mut self, translation: Offset, now: Instant) -> Result<(), GestureError> {
    if !translation.is_finite() {
      return Err(self.recover(GestureError::NonFiniteInput(translation.x, translation.y)));
    }
    if !matches!(self.phase, SwipePhase::Dragging { .. }) && !self.begin(now) {
      return Ok(());
    }
    if let SwipePhase::Dragging { origin, translation: current } = &mut self.phase {
      *current = translation;
      self.x.set(origin.x + translation.x);
      self.y.set(origin.y + translation.y);
    }
    Ok(())
  }

  /// End the gesture and decide. The outcome is also reported by
  /// [`tick`](Self::tick) once its animation settles.
  ///
  /// A release with no drag in progress is rejected and changes nothing. Any
  /// other failure forces the card back to neutral and counts as a cancel.
  pub fn release(&mut self, now: Instant) -> Result<SwipeOutcome, GestureError> {
    if !matches!(self.phase, SwipePhase::Dragging { .. }) {
      warn!("{}", GestureError::NotDragging);
      return Err(GestureError::NotDragging);
    }
    if !(self.viewport_width.is_finite() && self.viewport_width > 0.0) {
      return Err(self.recover(GestureError::InvalidViewport(self.viewport_width)));
    }
    let offset = self.offset(now);
    if !offset.is_finite() {
      return Err(self.recover(GestureError::NonFiniteInput(offset.x, offset.y)));
    }

    let outcome = if offset.x.abs() > self.threshold() {
      let direction = if offset.x > 0.0 {
        SwipeDirection::Right
      } else {
        SwipeDirection::Left
      };
      SwipeOutcome::Commit(direction)
    } else {
      SwipeOutcome::Cancel
    };

    let until = match outcome {
      SwipeOutcome::Commit(direction) => {
        let exit_x = direction.sign() * self.viewport_width * EXIT_DISTANCE_FACTOR;
        self.x.animate_to(exit_x, EXIT_DURATION, Easing::EaseInOutQuad, now);
        now + EXIT_DURATION
      }
      SwipeOutcome::Cancel => {
        self.x.animate_to(0.0, RETURN_DURATION, Easing::EaseOutCubic, now);
        self.y.animate_to(0.0, RETURN_DURATION, Easing::EaseOutCubic, now);
        self.scale.animate_to(1.0, RETURN_DURATION, Easing::EaseOutCubic, now);
        now + RETURN_DURATION
      }
    };

    debug!(dx = offset.x, threshold = self.threshold(), ?outcome, "swipe released");
    self.phase = SwipePhase::Settling { outcome, until };
    Ok(outcome)
  }

  /// A complete synthetic swipe in `direction`, as if dragged half a
  /// viewport and released.
  pub fn fling(
    &mut self,
    direction: SwipeDirection,
    now: Instant,
  ) -> Result<SwipeOutcome, GestureError> {
    if !self.begin(now) {
      return Err(GestureError::NotDragging);
    }
    let dx = direction.sign() * self.viewport_width * 0.5;
    self.drag(Offset::new(dx, 0.0), now)?;
    self.release(now)
  }

  /// Report the outcome of a finished animation, exactly once.
  ///
  /// After a commit the offset and scale are reset to neutral, ready for the
  /// next card.
  pub fn tick(&mut self, now: Instant) -> Option<SwipeOutcome> {
    let SwipePhase::Settling { outcome, until } = self.phase else {
      return None;
    };
    if now < until {
      return None;
    }
    if matches!(outcome, SwipeOutcome::Commit(_)) {
      self.reset();
    }
    self.phase = SwipePhase::Idle;
    Some(outcome)
  }

  /// Snap to neutral and forget any gesture in progress.
  pub fn reset(&mut self) {
    self.x.set(0.0);
    self.y.set(0.0);
    self.scale.set(1.0);
    self.phase = SwipePhase::Idle;
  }

  fn recover(&mut self, error: GestureError) -> GestureError {
    warn!("gesture failed, returning card to neutral: {error}");
    self.reset();
    error
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const WIDTH: f32 = 1000.0;

  fn swipe(dx: f32, dy: f32) -> (SwipeInterpreter, Instant, SwipeOutcome) {
    let t0 = Instant::now();
    let mut s = SwipeInterpreter::new(WIDTH);
    assert!(s.begin(t0));
    s.drag(Offset::new(dx, dy), t0).unwrap();
    let outcome = s.release(t0).unwrap();
    (s, t0, outcome)
  }

  #[test]
  fn release_exactly_at_threshold_cancels() {
    let (_, _, outcome) = swipe(300.0, 0.0);
    assert_eq!(outcome, SwipeOutcome::Cancel);
  }

  #[test]
  fn release_just_past_threshold_commits() {
    let (_, _, outcome) = swipe(301.0, 0.0);
    assert_eq!(outcome, SwipeOutcome::Commit(SwipeDirection::Right));
    let (_, _, outcome) = swipe(-301.0, 0.0);
    assert_eq!(outcome, SwipeOutcome::Commit(SwipeDirection::Left));
  }

  #[test]
  fn vertical_travel_does_not_commit() {
    let (_, _, outcome) = swipe(10.0, 900.0);
    assert_eq!(outcome, SwipeOutcome::Cancel);
  }

  #[test]
  fn commit_exits_in_direction_of_travel_keeping_vertical() {
    let (s, t0, _) = swipe(400.0, 120.0);
    let end = s.offset(t0 + EXIT_DURATION - Duration::from_millis(1));
    assert!(end.x > 400.0);
    assert_eq!(end.y, 120.0);

    let (s, t0, _) = swipe(-400.0, -50.0);
    let mid = s.offset(t0 + EXIT_DURATION / 2);
    assert!(mid.x < -400.0);
    assert_eq!(mid.y, -50.0);
  }

  #[test]
  fn outcome_is_reported_only_after_exit_settles() {
    let (mut s, t0, _) = swipe(500.0, 0.0);
    assert_eq!(s.tick(t0 + EXIT_DURATION - Duration::from_millis(1)), None);
    assert_eq!(
      s.tick(t0 + EXIT_DURATION),
      Some(SwipeOutcome::Commit(SwipeDirection::Right))
    );
    // Reported once, then neutral for the next card.
    assert_eq!(s.tick(t0 + EXIT_DURATION * 2), None);
    assert_eq!(s.offset(t0 + EXIT_DURATION), Offset::ZERO);
    assert_eq!(s.scale(t0 + EXIT_DURATION), 1.0);
    assert_eq!(s.phase(), SwipePhase::Idle);
  }

  #[test]
  fn cancelled_drag_returns_to_neutral() {
    let (mut s, t0, outcome) = swipe(100.0, 40.0);
    assert_eq!(outcome, SwipeOutcome::Cancel);
    assert_eq!(s.tick(t0 + RETURN_DURATION), Some(SwipeOutcome::Cancel));
    assert_eq!(s.offset(t0 + RETURN_DURATION), Offset::ZERO);
    assert_eq!(s.scale(t0 + RETURN_DURATION), 1.0);
  }

  #[test]
  fn scale_grows_while_held() {
    let t0 = Instant::now();
    let mut s = SwipeInterpreter::new(WIDTH);
    s.begin(t0);
    assert!((s.scale(t0 + SCALE_DURATION) - DRAG_SCALE).abs() < 1e-6);
  }

  #[test]
  fn regrab_during_return_starts_from_current_position() {
    let (mut s, t0, _) = swipe(200.0, 0.0);
    let mid = t0 + RETURN_DURATION / 2;
    let here = s.offset(mid);
    assert!(here.x > 0.0 && here.x < 200.0);

    assert!(s.begin(mid));
    s.drag(Offset::ZERO, mid).unwrap();
    assert_eq!(s.offset(mid), here);
    s.drag(Offset::new(10.0, 0.0), mid).unwrap();
    assert!((s.offset(mid).x - (here.x + 10.0)).abs() < 1e-4);
  }

  #[test]
  fn cannot_grab_a_leaving_card() {
    let (mut s, t0, _) = swipe(500.0, 0.0);
    assert!(!s.begin(t0 + Duration::from_millis(10)));
    s.drag(Offset::new(-500.0, 0.0), t0 + Duration::from_millis(10)).unwrap();
    assert!(matches!(s.phase(), SwipePhase::Settling { .. }));
  }

  #[test]
  fn non_finite_input_forces_neutral() {
    let t0 = Instant::now();
    let mut s = SwipeInterpreter::new(WIDTH);
    s.drag(Offset::new(200.0, 0.0), t0).unwrap();
    let err = s.drag(Offset::new(f32::NAN, 0.0), t0).unwrap_err();
    assert!(matches!(err, GestureError::NonFiniteInput(..)));
    assert_eq!(s.phase(), SwipePhase::Idle);
    assert_eq!(s.offset(t0), Offset::ZERO);
  }

  #[test]
  fn invalid_viewport_forces_neutral() {
    let t0 = Instant::now();
    let mut s = SwipeInterpreter::new(0.0);
    s.drag(Offset::new(50.0, 0.0), t0).unwrap();
    assert_eq!(s.release(t0), Err(GestureError::InvalidViewport(0.0)));
    assert_eq!(s.phase(), SwipePhase::Idle);
    assert_eq!(s.offset(t0), Offset::ZERO);
  }

  #[test]
  fn release_without_drag_is_rejected() {
    let mut s = SwipeInterpreter::new(WIDTH);
    assert_eq!(s.release(Instant::now()), Err(GestureError::NotDragging));
    assert_eq!(s.phase(), SwipePhase::Idle);
  }

  #[test]
  fn fling_commits() {
    let t0 = Instant::now();
    let mut s = SwipeInterpreter::new(WIDTH);
    assert_eq!(
      s.fling(SwipeDirection::Left, t0),
      Ok(SwipeOutcome::Commit(SwipeDirection::Left))
    );
  }
}
