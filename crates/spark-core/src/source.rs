//! The `ProfileSource` trait — the remote collection of user profiles.
//!
//! Implemented by backends (`spark-store-sqlite`, the CLI's HTTP client).
//! The discover queue depends on this abstraction only.

use std::future::Future;

use crate::{
  profile::{ProfileId, RawProfile},
  subscription::{OnData, OnError, Subscription},
};

/// A collection of profile documents.
///
/// All filtering happens client-side: the source returns every profile,
/// unpaginated.
pub trait ProfileSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch every profile document in the collection.
  fn fetch_all_profiles(
    &self,
  ) -> impl Future<Output = Result<Vec<RawProfile>, Self::Error>> + Send + '_;

  /// Listen for changes to a single profile document.
  ///
  /// `on_data` receives each fresh snapshot; `on_error` receives failures.
  /// Neither fires once the returned [`Subscription`] has been dropped.
  fn subscribe_profile(
    &self,
    id: &ProfileId,
    on_data: OnData<RawProfile>,
    on_error: OnError,
  ) -> Subscription;
}
