//! Persisted local key-value store for display hints that must survive an
//! unreachable data source.

use std::future::Future;

/// Last known background colour of the viewer's own profile.
pub const PROFILE_BACKGROUND_KEY: &str = "profile.background_color";

/// Email of the last signed-in user.
pub const SESSION_EMAIL_KEY: &str = "session.email";

pub trait LocalCache: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  fn set<'a>(
    &'a self,
    key: &'a str,
    value: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn remove<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
