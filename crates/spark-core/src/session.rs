//! The authenticated user on whose behalf the client runs.

use serde::{Deserialize, Serialize};

use crate::profile::{CandidateProfile, ProfileId};

/// Identity of the signed-in user.
///
/// Only what is needed to keep the user's own profile out of their feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveUser {
  /// Document id of the user's own profile, when known.
  pub id:    Option<ProfileId>,
  pub email: String,
}

impl ActiveUser {
  pub fn new(email: impl Into<String>) -> Self {
    Self { id: None, email: email.into() }
  }

  pub fn with_id(mut self, id: impl Into<ProfileId>) -> Self {
    self.id = Some(id.into());
    self
  }

  /// True when `profile` is this user's own profile, matched by id or by
  /// case-insensitive email.
  pub fn owns(&self, profile: &CandidateProfile) -> bool {
    if self.id.as_ref().is_some_and(|id| *id == profile.id) {
      return true;
    }
    let mine = self.email.trim();
    !mine.is_empty()
      && profile
        .email
        .as_deref()
        .is_some_and(|theirs| theirs.trim().eq_ignore_ascii_case(mine))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn profile(id: &str, email: Option<&str>) -> CandidateProfile {
    CandidateProfile {
      id:                       id.into(),
      first_name:               None,
      last_name:                None,
      email:                    email.map(str::to_string),
      birth_date:               None,
      profile_photo_url:        None,
      profile_background_color: None,
      selected_profile_banners: Vec::new(),
    }
  }

  #[test]
  fn matches_email_case_insensitively() {
    let me = ActiveUser::new("Me@Example.com");
    assert!(me.owns(&profile("a", Some(" me@example.com "))));
    assert!(!me.owns(&profile("b", Some("you@example.com"))));
    assert!(!me.owns(&profile("c", None)));
  }

  #[test]
  fn matches_id_even_without_email() {
    let me = ActiveUser::new("").with_id("self");
    assert!(me.owns(&profile("self", None)));
    assert!(!me.owns(&profile("other", None)));
  }
}
