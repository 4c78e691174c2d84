//! Observer registrations for live data.
//!
//! A source that pushes updates hands out a [`Subscription`] per
//! registration. Dropping the handle (or calling
//! [`Subscription::unsubscribe`]) tears the registration down, after which the
//! callbacks are never invoked again.

use std::{
  collections::HashMap,
  hash::Hash,
  sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

/// Invoked with each fresh value.
pub type OnData<T> = Box<dyn Fn(T) + Send + Sync + 'static>;

/// Invoked when the source fails to deliver a value.
pub type OnError = Box<dyn Fn(String) + Send + Sync + 'static>;

// ─── Subscription handle ─────────────────────────────────────────────────────

/// Unsubscribe handle. Teardown runs exactly once.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
  teardown: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
  pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
    Self { teardown: Some(Box::new(teardown)) }
  }

  /// A handle with nothing to tear down.
  pub fn noop() -> Self { Self { teardown: None } }

  pub fn unsubscribe(mut self) { self.run_teardown(); }

  fn run_teardown(&mut self) {
    if let Some(teardown) = self.teardown.take() {
      teardown();
    }
  }
}

impl Drop for Subscription {
  fn drop(&mut self) { self.run_teardown(); }
}

impl std::fmt::Debug for Subscription {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription")
      .field("active", &self.teardown.is_some())
      .finish()
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

struct Listener<K, T> {
  topic:    K,
  on_data:  OnData<T>,
  on_error: OnError,
}

struct Registry<K, T> {
  next_id:   u64,
  listeners: HashMap<u64, Listener<K, T>>,
}

/// Fan-out of `(on_data, on_error)` pairs keyed by topic.
///
/// Callbacks run while the registry lock is held, so a callback that has been
/// unsubscribed can never fire afterwards. Callbacks must therefore not call
/// back into the registry.
pub struct ListenerRegistry<K, T> {
  inner: Arc<Mutex<Registry<K, T>>>,
}

impl<K, T> Clone for ListenerRegistry<K, T> {
  fn clone(&self) -> Self { Self { inner: Arc::clone(&self.inner) } }
}

impl<K, T> Default for ListenerRegistry<K, T> {
  fn default() -> Self {
    Self {
      inner: Arc::new(Mutex::new(Registry { next_id: 0, listeners: HashMap::new() })),
    }
  }
}

impl<K, T> ListenerRegistry<K, T>
where
  K: Eq + Hash + Send + 'static,
  T: Clone + 'static,
{
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> MutexGuard<'_, Registry<K, T>> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Register a listener for `topic`.
  pub fn register(&self, topic: K, on_data: OnData<T>, on_error: OnError) -> Subscription
  where
    T: Send,
  {
    let id = {
      let mut reg = self.lock();
      let id = reg.next_id;
      reg.next_id += 1;
      reg.listeners.insert(id, Listener { topic, on_data, on_error });
      id
    };

    let weak: Weak<Mutex<Registry<K, T>>> = Arc::downgrade(&self.inner);
    Subscription::new(move || {
      if let Some(inner) = weak.upgrade() {
        inner
          .lock()
          .unwrap_or_else(PoisonError::into_inner)
          .listeners
          .remove(&id);
      }
    })
  }

  /// Deliver `value` to every listener on `topic`. Returns how many fired.
  pub fn publish(&self, topic: &K, value: &T) -> usize {
    let reg = self.lock();
    let mut fired = 0;
    for listener in reg.listeners.values().filter(|l| l.topic == *topic) {
      (listener.on_data)(value.clone());
      fired += 1;
    }
    fired
  }

  /// Report a failure to every listener on `topic`.
  pub fn publish_error(&self, topic: &K, message: &str) -> usize {
    let reg = self.lock();
    let mut fired = 0;
    for listener in reg.listeners.values().filter(|l| l.topic == *topic) {
      (listener.on_error)(message.to_string());
      fired += 1;
    }
    fired
  }

  pub fn listener_count(&self) -> usize { self.lock().listeners.len() }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;

  fn counter() -> (Arc<AtomicUsize>, OnData<u32>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    (hits, Box::new(move |_| {
      h.fetch_add(1, Ordering::SeqCst);
    }))
  }

  #[test]
  fn publish_reaches_only_matching_topic() {
    let reg: ListenerRegistry<&'static str, u32> = ListenerRegistry::new();
    let (a_hits, on_a) = counter();
    let (b_hits, on_b) = counter();
    let _a = reg.register("a", on_a, Box::new(|_| {}));
    let _b = reg.register("b", on_b, Box::new(|_| {}));

    assert_eq!(reg.publish(&"a", &1), 1);
    assert_eq!(a_hits.load(Ordering::SeqCst), 1);
    assert_eq!(b_hits.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn unsubscribed_callbacks_never_fire() {
    let reg: ListenerRegistry<&'static str, u32> = ListenerRegistry::new();
    let (hits, on_data) = counter();
    let sub = reg.register("a", on_data, Box::new(|_| {}));
    assert_eq!(reg.listener_count(), 1);

    sub.unsubscribe();
    assert_eq!(reg.listener_count(), 0);
    assert_eq!(reg.publish(&"a", &7), 0);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn dropping_the_handle_unsubscribes() {
    let reg: ListenerRegistry<&'static str, u32> = ListenerRegistry::new();
    {
      let (_hits, on_data) = counter();
      let _sub = reg.register("a", on_data, Box::new(|_| {}));
      assert_eq!(reg.listener_count(), 1);
    }
    assert_eq!(reg.listener_count(), 0);
  }

  #[test]
  fn errors_go_to_on_error() {
    let reg: ListenerRegistry<&'static str, u32> = ListenerRegistry::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let _sub = reg.register(
      "a",
      Box::new(|_| {}),
      Box::new(move |msg| s.lock().unwrap().push(msg)),
    );

    reg.publish_error(&"a", "offline");
    assert_eq!(*seen.lock().unwrap(), vec!["offline".to_string()]);
  }
}
