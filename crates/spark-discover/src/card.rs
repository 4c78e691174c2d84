//! The profile card view model.
//!
//! Pure display data for one candidate, with every absent field replaced by
//! its fallback. Building a card is the only step that can reject a
//! malformed record ([`RenderError`]); the screen then shows an
//! [`ErrorCard`] whose action reloads the queue.

use std::fmt;

use chrono::NaiveDate;
use spark_core::{
  age::age_label,
  profile::{CandidateProfile, ProfileBanner, ProfileId},
};

use crate::RenderError;

pub const ANONYMOUS_NAME: &str = "Anonymous User";
pub const NO_BANNERS_MESSAGE: &str = "No banners selected yet";
pub const SWIPE_INSTRUCTIONS: &str = "Swipe right to like · Swipe left to pass";
pub const NO_MORE_PROFILES: &str = "No more profiles";
pub const RETRY_LABEL: &str = "Try Again";

/// Banners shown per card in the discover feed.
pub const MAX_DISCOVER_BANNERS: usize = 3;

pub const FALLBACK_BACKGROUND: Rgb = Rgb { r: 0x5b, g: 0x4b, b: 0x8a };
pub const DEFAULT_BANNER_TEXT: Rgb = Rgb { r: 0xff, g: 0xff, b: 0xff };

// ─── Colour ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

impl Rgb {
  /// Parse `#rgb` or `#rrggbb` (the `#` is optional).
  pub fn parse(input: &str) -> Option<Self> {
    let hex = input.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
      return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
      3 => {
        let mut it = hex.chars().map(|c| channel(&c.to_string()).map(|v| v * 17));
        Some(Self { r: it.next()??, g: it.next()??, b: it.next()?? })
      }
      6 => Some(Self {
        r: channel(&hex[0..2])?,
        g: channel(&hex[2..4])?,
        b: channel(&hex[4..6])?,
      }),
      _ => None,
    }
  }
}

impl fmt::Display for Rgb {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
  }
}

fn color(field: &'static str, value: &str) -> Result<Rgb, RenderError> {
  Rgb::parse(value).ok_or_else(|| RenderError::InvalidColor { field, value: value.to_string() })
}

// ─── View model ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoSlot {
  Url(String),
  Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerChip {
  pub label:    String,
  pub value:    String,
  pub gradient: Vec<Rgb>,
  pub text:     Rgb,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BannerSlot {
  Chips(Vec<BannerChip>),
  Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
  pub id:           ProfileId,
  pub name:         String,
  pub age:          String,
  pub photo:        PhotoSlot,
  pub background:   Rgb,
  pub banners:      BannerSlot,
  pub instructions: &'static str,
}

impl CardView {
  pub fn build(candidate: &CandidateProfile, today: NaiveDate) -> Result<Self, RenderError> {
    let (background, chips) = palette(candidate)?;

    Ok(Self {
      id: candidate.id.clone(),
      name: candidate
        .display_name()
        .unwrap_or_else(|| ANONYMOUS_NAME.to_string()),
      age: age_label(candidate.birth_date.as_deref(), today),
      photo: candidate
        .profile_photo_url
        .clone()
        .map_or(PhotoSlot::Placeholder, PhotoSlot::Url),
      background,
      banners: if chips.is_empty() {
        BannerSlot::Empty(NO_BANNERS_MESSAGE)
      } else {
        BannerSlot::Chips(chips)
      },
      instructions: SWIPE_INSTRUCTIONS,
    })
  }
}

/// Whether `candidate` can be drawn at all. Only its colours can fail.
pub fn check_renderable(candidate: &CandidateProfile) -> Result<(), RenderError> {
  palette(candidate).map(|_| ())
}

fn palette(candidate: &CandidateProfile) -> Result<(Rgb, Vec<BannerChip>), RenderError> {
  let background = match candidate.profile_background_color.as_deref() {
    Some(c) => color("profileBackgroundColor", c)?,
    None => FALLBACK_BACKGROUND,
  };
  let chips = candidate
    .selected_profile_banners
    .iter()
    .take(MAX_DISCOVER_BANNERS)
    .map(|b| chip(b, background))
    .collect::<Result<Vec<_>, _>>()?;
  Ok((background, chips))
}

fn chip(banner: &ProfileBanner, background: Rgb) -> Result<BannerChip, RenderError> {
  let gradient = banner
    .gradient_colors
    .iter()
    .map(|c| color("gradientColors", c))
    .collect::<Result<Vec<_>, _>>()?;
  Ok(BannerChip {
    label:    banner.label.clone(),
    value:    banner.value.clone(),
    gradient: if gradient.is_empty() { vec![background] } else { gradient },
    text:     match banner.text_color.as_deref() {
      Some(c) => color("textColor", c)?,
      None => DEFAULT_BANNER_TEXT,
    },
  })
}

/// Shown in place of a card that could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCard {
  pub message: String,
  pub action:  &'static str,
}

impl ErrorCard {
  pub fn new(message: impl Into<String>) -> Self {
    Self { message: message.into(), action: RETRY_LABEL }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use spark_core::profile::RawProfile;

  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, 15).unwrap() }

  fn candidate(value: serde_json::Value) -> CandidateProfile {
    CandidateProfile::from_raw(&RawProfile::from_value(value).unwrap())
  }

  #[test]
  fn missing_fields_use_fallbacks() {
    let view = CardView::build(&candidate(json!({ "id": "x" })), today()).unwrap();
    assert_eq!(view.name, ANONYMOUS_NAME);
    assert_eq!(view.age, "N/A");
    assert_eq!(view.photo, PhotoSlot::Placeholder);
    assert_eq!(view.background, FALLBACK_BACKGROUND);
    assert_eq!(view.banners, BannerSlot::Empty(NO_BANNERS_MESSAGE));
    assert_eq!(view.instructions, SWIPE_INSTRUCTIONS);
  }

  #[test]
  fn invalid_birth_date_renders_na() {
    let view = CardView::build(
      &candidate(json!({ "id": "x", "birthDate": "yesterday-ish" })),
      today(),
    )
    .unwrap();
    assert_eq!(view.age, "N/A");
  }

  #[test]
  fn full_profile() {
    let view = CardView::build(
      &candidate(json!({
        "id": "x",
        "firstName": "Alex",
        "lastName": "Kim",
        "birthDate": "1996-01-20",
        "profilePhotoURL": "https://img.example.com/a.jpg",
        "profileBackgroundColor": "#0af",
      })),
      today(),
    )
    .unwrap();
    assert_eq!(view.name, "Alex Kim");
    assert_eq!(view.age, "28");
    assert_eq!(view.photo, PhotoSlot::Url("https://img.example.com/a.jpg".into()));
    assert_eq!(view.background, Rgb { r: 0x00, g: 0xaa, b: 0xff });
  }

  #[test]
  fn only_first_three_banners_are_shown() {
    let banners: Vec<_> = (0..5)
      .map(|i| json!({ "id": i.to_string(), "label": format!("L{i}"), "value": "v" }))
      .collect();
    let view = CardView::build(
      &candidate(json!({ "id": "x", "selectedProfileBanners": banners })),
      today(),
    )
    .unwrap();

    let BannerSlot::Chips(chips) = view.banners else {
      panic!("expected chips");
    };
    let labels: Vec<_> = chips.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, ["L0", "L1", "L2"]);
    assert_eq!(chips[0].gradient, vec![FALLBACK_BACKGROUND]);
    assert_eq!(chips[0].text, DEFAULT_BANNER_TEXT);
  }

  #[test]
  fn bad_colour_is_a_render_failure() {
    let err = CardView::build(
      &candidate(json!({
        "id": "x",
        "selectedProfileBanners": [ { "label": "a", "value": "b", "gradientColors": ["teal-ish"] } ]
      })),
      today(),
    )
    .unwrap_err();
    assert_eq!(err, RenderError::InvalidColor {
      field: "gradientColors",
      value: "teal-ish".into(),
    });

    assert!(CardView::build(
      &candidate(json!({ "id": "x", "profileBackgroundColor": "#12" })),
      today()
    )
    .is_err());
  }

  #[test]
  fn renderable_check_agrees_with_build() {
    let bad = candidate(json!({ "id": "x", "profileBackgroundColor": "nope" }));
    let good = candidate(json!({ "id": "y", "profileBackgroundColor": "#123" }));
    assert!(check_renderable(&bad).is_err());
    assert!(check_renderable(&good).is_ok());
  }

  #[test]
  fn rgb_parsing() {
    assert_eq!(Rgb::parse("#ffffff"), Some(Rgb { r: 255, g: 255, b: 255 }));
    assert_eq!(Rgb::parse("abc"), Some(Rgb { r: 0xaa, g: 0xbb, b: 0xcc }));
    assert_eq!(Rgb::parse("#gggggg"), None);
    assert_eq!(Rgb::parse("#ff00ff").map(|c| c.to_string()).as_deref(), Some("#ff00ff"));
  }
}
