//! Async HTTP client for the hosted profile collection.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use spark_core::{
  profile::{ProfileId, RawProfile},
  source::ProfileSource,
  subscription::{OnData, OnError, Subscription},
};
use thiserror::Error;
use tracing::debug;

/// Shortest period a profile listener polls at.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Connection settings for the profile API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url:      String,
  pub token:         Option<String>,
  /// How often a profile listener re-reads its document. Clamped to
  /// [`MIN_POLL_INTERVAL`].
  pub poll_interval: Duration,
}

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{path} → {status}")]
  Status { path: String, status: StatusCode },

  #[error("malformed profile: {0}")]
  Profile(#[from] spark_core::Error),

  #[error("expected a JSON array of profiles")]
  NotAnArray,
}

/// Async HTTP client for the profile REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config })
  }

  fn poll_period(&self) -> Duration { self.config.poll_interval.max(MIN_POLL_INTERVAL) }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  async fn get_json(&self, path: &str) -> Result<Value, ClientError> {
    let mut req = self.client.get(self.url(path));
    if let Some(token) = &self.config.token {
      req = req.bearer_auth(token);
    }
    let resp = req.send().await?;
    if !resp.status().is_success() {
      return Err(ClientError::Status { path: path.to_string(), status: resp.status() });
    }
    Ok(resp.json().await?)
  }

  /// `GET /api/profiles/{id}`
  pub async fn get_profile(&self, id: &ProfileId) -> Result<RawProfile, ClientError> {
    let value = self.get_json(&format!("/profiles/{id}")).await?;
    Ok(RawProfile::from_value(value)?)
  }
}

impl ProfileSource for ApiClient {
  type Error = ClientError;

  /// `GET /api/profiles`
  async fn fetch_all_profiles(&self) -> Result<Vec<RawProfile>, ClientError> {
    let Value::Array(items) = self.get_json("/profiles").await? else {
      return Err(ClientError::NotAnArray);
    };
    items
      .into_iter()
      .map(|v| RawProfile::from_value(v).map_err(ClientError::from))
      .collect()
  }

  /// Polls `GET /api/profiles/{id}` and reports each changed snapshot.
  fn subscribe_profile(
    &self,
    id: &ProfileId,
    on_data: OnData<RawProfile>,
    on_error: OnError,
  ) -> Subscription {
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
      on_error("no async runtime to poll profile updates".into());
      return Subscription::noop();
    };

    let client = self.clone();
    let id = id.clone();
    let task = runtime.spawn(async move {
      let mut ticker = tokio::time::interval(client.poll_period());
      let mut last: Option<RawProfile> = None;
      loop {
        ticker.tick().await;
        match client.get_profile(&id).await {
          Ok(profile) if last.as_ref() != Some(&profile) => {
            debug!(profile = %id, "profile changed");
            last = Some(profile.clone());
            on_data(profile);
          }
          Ok(_) => {}
          Err(e) => on_error(e.to_string()),
        }
      }
    });

    Subscription::new(move || task.abort())
  }
}
