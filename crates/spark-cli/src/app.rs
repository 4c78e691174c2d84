//! Application state machine and event dispatcher.

use std::{sync::Arc, time::Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use spark_core::{
  cache::{LocalCache, PROFILE_BACKGROUND_KEY, SESSION_EMAIL_KEY},
  profile::{CandidateProfile, RawProfile},
  session::ActiveUser,
  source::ProfileSource,
  subscription::Subscription,
};
use spark_discover::{
  gesture::SwipeDirection,
  queue::{Advance, ProfileQueue},
  screen::{DiscoverScreen, DiscoverView},
};
use spark_store_sqlite::SqliteStore;
use tokio::sync::mpsc;
use tracing::{info, warn};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// The swipeable feed.
  Discover,
  /// The viewer's own profile.
  Profile,
  Settings,
}

/// Delivered by the viewer's own-profile listener.
enum ViewerEvent {
  Snapshot(RawProfile),
  Failed(String),
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<S: ProfileSource + 'static> {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  pub discover: DiscoverScreen<S>,

  pub viewer: ActiveUser,

  /// Latest snapshot of the viewer's own profile, if one has arrived.
  pub own_profile: Option<CandidateProfile>,

  /// Background colour of the viewer's profile: live when available,
  /// otherwise the last persisted value.
  pub background: Option<String>,

  /// True while `background` comes from the local cache only.
  pub background_is_cached: bool,

  /// Where profiles come from, for the settings screen.
  pub source_label: String,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Set when the user logged out rather than quit.
  pub signed_out: bool,

  cache:         SqliteStore,
  events:        mpsc::UnboundedReceiver<ViewerEvent>,
  _subscription: Option<Subscription>,
}

impl<S: ProfileSource + 'static> App<S> {
  /// Mount the discover screen, restore cached display hints and start
  /// listening to the viewer's own profile.
  pub async fn new(
    source: Arc<S>,
    viewer: ActiveUser,
    own_profile: Option<RawProfile>,
    cache: SqliteStore,
    source_label: String,
    viewport_width: f32,
  ) -> Self {
    let cached_background = match cache.get(PROFILE_BACKGROUND_KEY).await {
      Ok(v) => v,
      Err(e) => {
        warn!("reading cached background colour: {e}");
        None
      }
    };

    let (tx, events) = mpsc::unbounded_channel();
    let subscription = viewer.id.as_ref().map(|id| {
      let err_tx = tx.clone();
      source.subscribe_profile(
        id,
        Box::new(move |p| {
          let _ = tx.send(ViewerEvent::Snapshot(p));
        }),
        Box::new(move |e| {
          let _ = err_tx.send(ViewerEvent::Failed(e));
        }),
      )
    });

    let queue = ProfileQueue::new(source, viewer.clone());
    let mut app = Self {
      screen: Screen::Discover,
      discover: DiscoverScreen::mount(queue, viewport_width),
      viewer,
      own_profile: None,
      background_is_cached: cached_background.is_some(),
      background: cached_background,
      source_label,
      status_msg: "Loading profiles…".into(),
      signed_out: false,
      cache,
      events,
      _subscription: subscription,
    };

    if let Some(raw) = own_profile {
      app.apply_own_profile(raw).await;
    }
    app
  }

  // ── Frame ─────────────────────────────────────────────────────────────────

  /// Advance animations and apply anything that arrived since the last frame.
  pub async fn tick(&mut self, now: Instant) {
    let was_loading = self.discover.queue().is_loading();
    match self.discover.tick(now) {
      Some(Advance::Exhausted) => self.status_msg = "Looking for more profiles…".into(),
      Some(_) => self.status_msg.clear(),
      None => {}
    }
    if was_loading && !self.discover.queue().is_loading() {
      self.status_msg = match self.discover.queue().last_error() {
        Some(e) => format!("Error: {e}"),
        None => String::new(),
      };
    }

    while let Ok(event) = self.events.try_recv() {
      match event {
        ViewerEvent::Snapshot(raw) => self.apply_own_profile(raw).await,
        ViewerEvent::Failed(e) => {
          warn!("own profile listener: {e}");
          self.status_msg = format!("Profile sync failed: {e}");
        }
      }
    }
  }

  async fn apply_own_profile(&mut self, raw: RawProfile) {
    let profile = CandidateProfile::from_raw(&raw);
    if let Some(colour) = profile.profile_background_color.clone() {
      let fresher = self.background_is_cached || self.background.as_deref() != Some(&colour);
      if fresher && let Err(e) = self.cache.set(PROFILE_BACKGROUND_KEY, &colour).await {
        warn!("persisting background colour: {e}");
      }
      self.background = Some(colour);
      self.background_is_cached = false;
    }
    self.own_profile = Some(profile);
  }

  pub fn view(&self, now: Instant) -> DiscoverView {
    self.discover.view(now, chrono::Local::now().date_naive())
  }

  // ── Input ─────────────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Char('L') => {
        self.logout().await;
        return false;
      }
      _ => {}
    }

    match self.screen {
      Screen::Discover => self.handle_discover_key(key, now),
      Screen::Profile | Screen::Settings => {
        if matches!(key.code, KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h')) {
          self.screen = Screen::Discover;
        }
      }
    }
    true
  }

  fn handle_discover_key(&mut self, key: KeyEvent, now: Instant) {
    match key.code {
      KeyCode::Left | KeyCode::Char('h') => {
        self.discover.swipe_card(SwipeDirection::Left, now);
      }
      KeyCode::Right | KeyCode::Char('l') => {
        self.discover.swipe_card(SwipeDirection::Right, now);
      }
      KeyCode::Char('r') => {
        let offer_reload = matches!(
          self.view(now),
          DiscoverView::Exhausted | DiscoverView::LoadFailed(_) | DiscoverView::RenderFailed(_)
        );
        if offer_reload && self.discover.retry() {
          self.status_msg = "Loading profiles…".into();
        }
      }
      KeyCode::Char('p') => self.screen = Screen::Profile,
      KeyCode::Char('s') => self.screen = Screen::Settings,
      _ => {}
    }
  }

  /// Forward left-button drags on the discover screen to the card.
  pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
    if self.screen != Screen::Discover {
      return;
    }
    let (x, y) = (f32::from(mouse.column), f32::from(mouse.row));
    match mouse.kind {
      MouseEventKind::Down(MouseButton::Left) => self.discover.pointer_down(x, y, now),
      MouseEventKind::Drag(MouseButton::Left) => self.discover.pointer_move(x, y, now),
      MouseEventKind::Up(MouseButton::Left) => {
        self.discover.pointer_up(now);
      }
      _ => {}
    }
  }

  pub fn resize(&mut self, width: u16) { self.discover.resize(f32::from(width)); }

  /// Forget the remembered session. The caller exits afterwards.
  async fn logout(&mut self) {
    if let Err(e) = self.cache.remove(SESSION_EMAIL_KEY).await {
      warn!("clearing session: {e}");
    }
    info!(email = %self.viewer.email, "signed out");
    self.signed_out = true;
  }
}
