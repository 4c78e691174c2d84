//! Owned animatable scalar values.
//!
//! Time is always supplied by the caller, so the same instant gives the same
//! value and tests need no clock.

use std::time::{Duration, Instant};

/// Interpolation curve for [`AnimatedValue::animate_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
  Linear,
  #[default]
  EaseOutCubic,
  EaseInOutQuad,
}

impl Easing {
  /// Map linear progress `t` in `[0, 1]` onto the curve.
  pub fn apply(self, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    match self {
      Easing::Linear => t,
      Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
      Easing::EaseInOutQuad => {
        if t < 0.5 {
          2.0 * t * t
        } else {
          1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
        }
      }
    }
  }
}

#[derive(Debug, Clone, Copy)]
struct Transition {
  from:     f32,
  started:  Instant,
  duration: Duration,
  easing:   Easing,
}

/// A scalar that is either at rest or moving towards a target.
#[derive(Debug, Clone)]
pub struct AnimatedValue {
  target:     f32,
  transition: Option<Transition>,
}

impl AnimatedValue {
  pub fn new(value: f32) -> Self { Self { target: value, transition: None } }

  /// Jump to `value`, cancelling any running animation.
  pub fn set(&mut self, value: f32) {
    self.target = value;
    self.transition = None;
  }

  /// Animate from the value at `now` to `target`.
  ///
  /// Starting from the current interpolated value means an interrupted
  /// animation continues without a jump.
  pub fn animate_to(&mut self, target: f32, duration: Duration, easing: Easing, now: Instant) {
    let from = self.value_at(now);
    self.target = target;
    self.transition = (!duration.is_zero()).then_some(Transition {
      from,
      started: now,
      duration,
      easing,
    });
  }

  /// The value at `now`.
  pub fn value_at(&self, now: Instant) -> f32 {
    let Some(t) = self.transition else {
      return self.target;
    };
    let elapsed = now.saturating_duration_since(t.started);
    if elapsed >= t.duration {
      return self.target;
    }
    let progress = t.easing.apply(elapsed.as_secs_f32() / t.duration.as_secs_f32());
    t.from + (self.target - t.from) * progress
  }

  /// The value this cell is heading to (or resting at).
  pub fn target(&self) -> f32 { self.target }

  pub fn is_settled(&self, now: Instant) -> bool {
    self
      .transition
      .is_none_or(|t| now.saturating_duration_since(t.started) >= t.duration)
  }

  /// When the running animation reaches its target, if one is running.
  pub fn settles_at(&self) -> Option<Instant> {
    self.transition.map(|t| t.started + t.duration)
  }
}

impl Default for AnimatedValue {
  fn default() -> Self { Self::new(0.0) }
}
