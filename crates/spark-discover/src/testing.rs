//! In-memory `ProfileSource` for unit tests.

use std::{
  collections::VecDeque,
  sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use serde_json::{Value, json};
use spark_core::{
  profile::{ProfileId, RawProfile},
  source::ProfileSource,
  subscription::{ListenerRegistry, OnData, OnError, Subscription},
};
use tokio::sync::watch;

#[derive(Debug, thiserror::Error)]
#[error("scripted failure: {0}")]
pub struct ScriptedError(pub String);

/// Serves queued responses in order; repeats `fallback` once the script runs
/// out. Fetches can be held open with [`ScriptedSource::hold`].
pub struct ScriptedSource {
  script:    Mutex<VecDeque<Result<Vec<RawProfile>, String>>>,
  fallback:  Mutex<Vec<RawProfile>>,
  fetches:   AtomicUsize,
  held:      watch::Sender<bool>,
  listeners: ListenerRegistry<ProfileId, RawProfile>,
}

impl ScriptedSource {
  pub fn serving(profiles: Vec<RawProfile>) -> Arc<Self> {
    Arc::new(Self {
      script:    Mutex::new(VecDeque::new()),
      fallback:  Mutex::new(profiles),
      fetches:   AtomicUsize::new(0),
      held:      watch::Sender::new(false),
      listeners: ListenerRegistry::new(),
    })
  }

  pub fn then_fail(&self, message: &str) {
    self.script.lock().unwrap().push_back(Err(message.to_string()));
  }

  pub fn then_serve(&self, profiles: Vec<RawProfile>) {
    self.script.lock().unwrap().push_back(Ok(profiles));
  }

  /// Block all subsequent fetches until [`ScriptedSource::release`].
  pub fn hold(&self) { self.held.send_replace(true); }

  pub fn release(&self) { self.held.send_replace(false); }

  pub fn fetch_count(&self) -> usize { self.fetches.load(Ordering::SeqCst) }
}

impl ProfileSource for ScriptedSource {
  type Error = ScriptedError;

  async fn fetch_all_profiles(&self) -> Result<Vec<RawProfile>, ScriptedError> {
    self.fetches.fetch_add(1, Ordering::SeqCst);
    let mut held = self.held.subscribe();
    if held.wait_for(|held| !*held).await.is_err() {
      return Err(ScriptedError("source dropped".into()));
    }
    let next = self.script.lock().unwrap().pop_front();
    match next {
      Some(Ok(batch)) => Ok(batch),
      Some(Err(msg)) => Err(ScriptedError(msg)),
      None => Ok(self.fallback.lock().unwrap().clone()),
    }
  }

  fn subscribe_profile(
    &self,
    id: &ProfileId,
    on_data: OnData<RawProfile>,
    on_error: OnError,
  ) -> Subscription {
    self.listeners.register(id.clone(), on_data, on_error)
  }
}

/// A profile document with a name and email.
pub fn person(id: &str, first: &str, last: &str) -> RawProfile {
  doc(json!({
    "id": id,
    "firstName": first,
    "lastName": last,
    "email": format!("{id}@example.com"),
  }))
}

pub fn doc(value: Value) -> RawProfile { RawProfile::from_value(value).unwrap() }
