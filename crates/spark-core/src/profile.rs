//! Profile records: raw documents as delivered by the data source, and the
//! typed [`CandidateProfile`] snapshot decoded from them.
//!
//! Decoding is tolerant field by field: a value of the wrong shape is treated
//! as absent so that display fallbacks apply, rather than discarding the whole
//! candidate.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque document identifier, unique within a loaded batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ProfileId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for ProfileId {
  fn from(s: &str) -> Self { Self::new(s) }
}

// ─── Raw record ──────────────────────────────────────────────────────────────

/// Field names as they appear in stored documents.
pub mod fields {
  pub const ID: &str = "id";
  pub const FIRST_NAME: &str = "firstName";
  pub const LAST_NAME: &str = "lastName";
  pub const EMAIL: &str = "email";
  pub const BIRTH_DATE: &str = "birthDate";
  pub const PHOTO_URL: &str = "profilePhotoURL";
  pub const BACKGROUND_COLOR: &str = "profileBackgroundColor";
  pub const BANNERS: &str = "selectedProfileBanners";
}

/// One profile document: its id plus a mapping of field name to value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawProfile {
  pub id:     ProfileId,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

impl RawProfile {
  pub fn new(id: impl Into<ProfileId>, fields: Map<String, Value>) -> Self {
    Self { id: id.into(), fields }
  }

  /// Build a record from a JSON document carrying its own `id` field.
  ///
  /// String and integer ids are accepted; anything else is
  /// [`Error::MissingId`].
  pub fn from_value(value: Value) -> Result<Self> {
    let Value::Object(mut fields) = value else {
      return Err(Error::NotAnObject(value.to_string()));
    };
    let id = match fields.remove(fields::ID) {
      Some(Value::String(s)) if !s.trim().is_empty() => s,
      Some(Value::Number(n)) => n.to_string(),
      _ => return Err(Error::MissingId),
    };
    Ok(Self { id: ProfileId(id), fields })
  }

  /// Serialise back into a single JSON object including `id`.
  pub fn to_value(&self) -> Value {
    let mut obj = self.fields.clone();
    obj.insert(fields::ID.into(), Value::String(self.id.0.clone()));
    Value::Object(obj)
  }

  fn string(&self, key: &str) -> Option<String> { string_field(&self.fields, key) }
}

impl From<String> for ProfileId {
  fn from(s: String) -> Self { Self(s) }
}

// ─── Typed snapshot ──────────────────────────────────────────────────────────

/// A labelled display chip summarising one trait of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileBanner {
  pub id:              String,
  pub label:           String,
  pub value:           String,
  pub gradient_colors: Vec<String>,
  pub text_color:      Option<String>,
}

/// An immutable snapshot of a profile taken at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
  pub id:                       ProfileId,
  pub first_name:               Option<String>,
  pub last_name:                Option<String>,
  pub email:                    Option<String>,
  /// Kept verbatim; only [`crate::age::calculate_age`] interprets it.
  pub birth_date:               Option<String>,
  pub profile_photo_url:        Option<String>,
  pub profile_background_color: Option<String>,
  pub selected_profile_banners: Vec<ProfileBanner>,
}

impl CandidateProfile {
  /// Decode a raw record. Never fails; malformed fields become `None`.
  pub fn from_raw(raw: &RawProfile) -> Self {
    Self {
      id:                       raw.id.clone(),
      first_name:               raw.string(fields::FIRST_NAME),
      last_name:                raw.string(fields::LAST_NAME),
      email:                    raw.string(fields::EMAIL),
      birth_date:               raw.fields.get(fields::BIRTH_DATE).and_then(birth_date),
      profile_photo_url:        raw.string(fields::PHOTO_URL),
      profile_background_color: raw.string(fields::BACKGROUND_COLOR),
      selected_profile_banners: raw
        .fields
        .get(fields::BANNERS)
        .and_then(Value::as_array)
        .map(|items| {
          items
            .iter()
            .enumerate()
            .filter_map(|(i, v)| banner(i, v))
            .collect()
        })
        .unwrap_or_default(),
    }
  }

  /// `"First Last"`, or whichever half is present; `None` when neither is.
  pub fn display_name(&self) -> Option<String> {
    let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
      .into_iter()
      .flatten()
      .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
  }
}

// ─── Field decoders ──────────────────────────────────────────────────────────

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
  match map.get(key)? {
    Value::String(s) => {
      let s = s.trim();
      (!s.is_empty()).then(|| s.to_string())
    }
    _ => None,
  }
}

/// Strings pass through; `{ seconds, nanoseconds }` timestamp objects and
/// epoch-millisecond numbers are rendered as RFC 3339 in local time, so the
/// calendar date is the one the user entered.
fn birth_date(value: &Value) -> Option<String> {
  match value {
    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
    Value::Object(ts) => {
      let secs = ts.get("seconds").or_else(|| ts.get("_seconds"))?.as_i64()?;
      let nanos = ts
        .get("nanoseconds")
        .or_else(|| ts.get("_nanoseconds"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
      DateTime::from_timestamp(secs, u32::try_from(nanos).ok()?)
        .map(|dt| dt.with_timezone(&Local).to_rfc3339())
    }
    Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?)
      .map(|dt| dt.with_timezone(&Local).to_rfc3339()),
    _ => None,
  }
}

fn banner(index: usize, value: &Value) -> Option<ProfileBanner> {
  let obj = value.as_object()?;
  let text = |key: &str| match obj.get(key) {
    Some(Value::String(s)) => Some(s.clone()),
    Some(Value::Number(n)) => Some(n.to_string()),
    Some(Value::Bool(b)) => Some(b.to_string()),
    _ => None,
  };
  Some(ProfileBanner {
    id:              text("id").unwrap_or_else(|| index.to_string()),
    label:           text("label").unwrap_or_default(),
    value:           text("value").unwrap_or_default(),
    gradient_colors: obj
      .get("gradientColors")
      .and_then(Value::as_array)
      .map(|cs| cs.iter().filter_map(|c| c.as_str().map(str::to_string)).collect())
      .unwrap_or_default(),
    text_color:      string_field(obj, "textColor"),
  })
}
