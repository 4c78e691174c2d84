//! [`ProfileQueue`] — the ordered list of candidates shown in the feed.
//!
//! The queue is owned by the screen that mounted it. Loads run as tasks on
//! the tokio runtime; their results are applied on the owner's thread via
//! [`ProfileQueue::poll_load`] or [`ProfileQueue::wait_for_load`]. Dropping the
//! queue aborts any load still in flight, so a late result is never applied.

use std::{
  collections::{HashSet, VecDeque},
  sync::Arc,
};

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use spark_core::{
  profile::{CandidateProfile, RawProfile},
  session::ActiveUser,
  source::ProfileSource,
};
use tokio::{
  sync::oneshot::{self, error::TryRecvError},
  task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::QueueError;

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// What [`ProfileQueue::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
  /// The head was dropped; a new candidate is current.
  Next,
  /// The last candidate was dismissed; a reload has been requested.
  Exhausted,
  /// Nothing to advance past.
  Empty,
}

/// Coarse state for the screen to present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueStatus {
  /// No load has been requested yet.
  Idle,
  /// Empty, with a load in flight.
  Loading,
  /// At least one candidate is available.
  Ready,
  /// The last load succeeded but left no candidates.
  Exhausted,
  /// Empty because the last load failed.
  Failed(String),
}

// ─── Queue ───────────────────────────────────────────────────────────────────

struct PendingLoad<E> {
  result: oneshot::Receiver<Result<Vec<RawProfile>, E>>,
  task:   JoinHandle<()>,
}

pub struct ProfileQueue<S: ProfileSource + 'static> {
  source:      Arc<S>,
  viewer:      ActiveUser,
  candidates:  VecDeque<CandidateProfile>,
  rng:         StdRng,
  pending:     Option<PendingLoad<S::Error>>,
  last_error:  Option<QueueError>,
  loaded_once: bool,
}

impl<S: ProfileSource + 'static> ProfileQueue<S> {
  pub fn new(source: Arc<S>, viewer: ActiveUser) -> Self {
    Self::with_rng(source, viewer, StdRng::from_entropy())
  }

  /// A queue whose shuffles are reproducible.
  pub fn with_seed(source: Arc<S>, viewer: ActiveUser, seed: u64) -> Self {
    Self::with_rng(source, viewer, StdRng::seed_from_u64(seed))
  }

  fn with_rng(source: Arc<S>, viewer: ActiveUser, rng: StdRng) -> Self {
    Self {
      source,
      viewer,
      candidates: VecDeque::new(),
      rng,
      pending: None,
      last_error: None,
      loaded_once: false,
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// The candidate on screen: always the head of the queue.
  pub fn current(&self) -> Option<&CandidateProfile> { self.candidates.front() }

  pub fn candidates(&self) -> impl ExactSizeIterator<Item = &CandidateProfile> {
    self.candidates.iter()
  }

  pub fn len(&self) -> usize { self.candidates.len() }

  pub fn is_empty(&self) -> bool { self.candidates.is_empty() }

  pub fn is_loading(&self) -> bool { self.pending.is_some() }

  pub fn last_error(&self) -> Option<&QueueError> { self.last_error.as_ref() }

  pub fn viewer(&self) -> &ActiveUser { &self.viewer }

  pub fn status(&self) -> QueueStatus {
    if !self.candidates.is_empty() {
      QueueStatus::Ready
    } else if self.pending.is_some() {
      QueueStatus::Loading
    } else if let Some(e) = &self.last_error {
      QueueStatus::Failed(e.to_string())
    } else if self.loaded_once {
      QueueStatus::Exhausted
    } else {
      QueueStatus::Idle
    }
  }

  // ── Loading ───────────────────────────────────────────────────────────────

  /// Fetch, filter and shuffle a fresh batch, replacing the queue.
  ///
  /// If a load is already in flight this awaits that one instead of starting
  /// another. On failure the queue is left as it was.
  pub async fn load(&mut self) -> Result<usize, QueueError> {
    self.request_load();
    match self.wait_for_load().await {
      Some(outcome) => outcome,
      None => Err(self.last_error.clone().unwrap_or(QueueError::Cancelled)),
    }
  }

  /// Start a load in the background. Returns `false` when one is already in
  /// flight, in which case the request is ignored.
  pub fn request_load(&mut self) -> bool {
    if self.pending.is_some() {
      debug!("load already in flight; ignoring request");
      return false;
    }

    let runtime = match tokio::runtime::Handle::try_current() {
      Ok(handle) => handle,
      Err(e) => {
        warn!("cannot load profiles: {e}");
        self.last_error = Some(QueueError::NoRuntime);
        return false;
      }
    };

    let (tx, rx) = oneshot::channel();
    let source = Arc::clone(&self.source);
    let task = runtime.spawn(async move {
      let result = source.fetch_all_profiles().await;
      // The receiver is gone if the queue was dropped; nothing to apply.
      let _ = tx.send(result);
    });

    self.pending = Some(PendingLoad { result: rx, task });
    true
  }

  /// Apply a finished background load, if there is one.
  pub fn poll_load(&mut self) -> Option<Result<usize, QueueError>> {
    let pending = self.pending.as_mut()?;
    match pending.result.try_recv() {
      Ok(result) => {
        self.pending = None;
        Some(self.apply(result))
      }
      Err(TryRecvError::Empty) => None,
      Err(TryRecvError::Closed) => {
        self.pending = None;
        Some(self.fail(QueueError::Cancelled))
      }
    }
  }

  /// Await the in-flight load and apply it. `None` if nothing is in flight.
  pub async fn wait_for_load(&mut self) -> Option<Result<usize, QueueError>> {
    let pending = self.pending.take()?;
    Some(match pending.result.await {
      Ok(result) => self.apply(result),
      Err(_) => self.fail(QueueError::Cancelled),
    })
  }

  fn apply(&mut self, result: Result<Vec<RawProfile>, S::Error>) -> Result<usize, QueueError> {
    match result {
      Ok(raw) => {
        let batch = prepare_batch(&raw, &self.viewer, &mut self.rng);
        let count = batch.len();
        info!(fetched = raw.len(), queued = count, "loaded profiles");
        self.candidates = batch.into();
        self.last_error = None;
        self.loaded_once = true;
        Ok(count)
      }
      Err(e) => self.fail(QueueError::Load(e.to_string())),
    }
  }

  fn fail(&mut self, error: QueueError) -> Result<usize, QueueError> {
    warn!("{error}");
    self.last_error = Some(error.clone());
    Err(error)
  }

  // ── Advancing ─────────────────────────────────────────────────────────────

  /// Dismiss the current candidate.
  ///
  /// Dismissing the last one empties the queue immediately and requests a
  /// reload.
  pub fn advance(&mut self) -> Advance {
    match self.candidates.len() {
      0 => Advance::Empty,
      1 => {
        self.candidates.clear();
        self.request_load();
        Advance::Exhausted
      }
      _ => {
        self.candidates.pop_front();
        Advance::Next
      }
    }
  }
}

impl<S: ProfileSource + 'static> Drop for ProfileQueue<S> {
  fn drop(&mut self) {
    if let Some(pending) = self.pending.take() {
      pending.task.abort();
    }
  }
}

/// Decode `raw`, drop the viewer's own profile and duplicate ids, then
/// shuffle uniformly.
pub fn prepare_batch<R: Rng + ?Sized>(
  raw: &[RawProfile],
  viewer: &ActiveUser,
  rng: &mut R,
) -> Vec<CandidateProfile> {
  let mut seen = HashSet::new();
  let mut batch: Vec<CandidateProfile> = raw
    .iter()
    .map(CandidateProfile::from_raw)
    .filter(|c| !viewer.owns(c))
    .filter(|c| seen.insert(c.id.clone()))
    .collect();
  batch.shuffle(rng);
  batch
}
