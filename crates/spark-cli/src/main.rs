//! `spark` — terminal discover feed.
//!
//! # Usage
//!
//! ```
//! spark --email me@example.com --url https://profiles.example.com
//! spark --email me@example.com --db spark.db
//! spark import profiles.json
//! ```

mod app;
mod client;
mod ui;

use std::{
  fs::File,
  io,
  path::{Path, PathBuf},
  sync::{Arc, Mutex},
  time::{Duration, Instant},
};

use anyhow::{Context, Result, bail};
use app::App;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, DisableMouseCapture, EnableMouseCapture, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use spark_core::{
  cache::{LocalCache, SESSION_EMAIL_KEY},
  profile::{CandidateProfile, RawProfile},
  session::ActiveUser,
  source::ProfileSource,
};
use spark_store_sqlite::SqliteStore;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "spark", about = "Swipe through profiles from the terminal")]
struct Args {
  #[command(subcommand)]
  command: Option<Command>,

  /// Path to a TOML config file (url, token, email, db, poll_secs).
  #[arg(short, long, value_name = "FILE", global = true)]
  config: Option<PathBuf>,

  /// Base URL of the profile API. Without one, profiles are read from the
  /// local database.
  #[arg(long, env = "SPARK_URL", global = true)]
  url: Option<String>,

  /// Bearer token for the profile API.
  #[arg(long, env = "SPARK_TOKEN", global = true)]
  token: Option<String>,

  /// Email of the signed-in user (default: the last session).
  #[arg(long, env = "SPARK_EMAIL", global = true)]
  email: Option<String>,

  /// Local SQLite database (default: spark.db).
  #[arg(long, env = "SPARK_DB", global = true)]
  db: Option<PathBuf>,

  /// Where to write logs; the terminal belongs to the UI.
  #[arg(long, default_value = "spark.log", global = true)]
  log_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Load a JSON array of profile documents into the local database.
  Import {
    file: PathBuf,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:       String,
  #[serde(default)]
  token:     String,
  #[serde(default)]
  email:     String,
  #[serde(default)]
  db:        String,
  poll_secs: Option<u64>,
}

fn non_empty(s: &str) -> Option<String> { (!s.is_empty()).then(|| s.to_string()) }

fn init_tracing(path: &Path) -> Result<()> {
  let file = File::options()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  init_tracing(&args.log_file)?;

  // CLI flags override config file, which overrides defaults.
  let db_path = args
    .db
    .or_else(|| non_empty(&file_cfg.db).map(PathBuf::from))
    .unwrap_or_else(|| PathBuf::from("spark.db"));
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("opening database {}", db_path.display()))?;

  if let Some(Command::Import { file }) = &args.command {
    let json = std::fs::read_to_string(file)
      .with_context(|| format!("reading {}", file.display()))?;
    let written = store.import_json(&json).await.context("importing profiles")?;
    println!("imported {written} profiles into {}", db_path.display());
    return Ok(());
  }

  let email = match args.email.or_else(|| non_empty(&file_cfg.email)) {
    Some(email) => email,
    None => match store.get(SESSION_EMAIL_KEY).await.context("reading session")? {
      Some(email) => email,
      None => bail!("no signed-in user: pass --email or set SPARK_EMAIL"),
    },
  };
  store
    .set(SESSION_EMAIL_KEY, &email)
    .await
    .context("saving session")?;

  match args.url.or_else(|| non_empty(&file_cfg.url)) {
    Some(base_url) => {
      let client = ApiClient::new(ApiConfig {
        base_url: base_url.clone(),
        token: args.token.or_else(|| non_empty(&file_cfg.token)),
        poll_interval: Duration::from_secs(file_cfg.poll_secs.unwrap_or(5)),
      })?;
      run(Arc::new(client), email, store, base_url).await
    }
    None => {
      let label = format!("local database {}", db_path.display());
      run(Arc::new(store.clone()), email, store, label).await
    }
  }
}

/// Look up the signed-in user's own profile so it can be excluded by id and
/// shown on the profile screen.
async fn resolve_viewer<S: ProfileSource>(
  source: &S,
  email: String,
) -> (ActiveUser, Option<RawProfile>) {
  let viewer = ActiveUser::new(email);
  let all = match source.fetch_all_profiles().await {
    Ok(all) => all,
    Err(e) => {
      warn!("resolving own profile: {e}");
      return (viewer, None);
    }
  };
  match all
    .into_iter()
    .find(|raw| viewer.owns(&CandidateProfile::from_raw(raw)))
  {
    Some(own) => (viewer.with_id(own.id.clone()), Some(own)),
    None => (viewer, None),
  }
}

async fn run<S: ProfileSource + 'static>(
  source: Arc<S>,
  email: String,
  cache: SqliteStore,
  source_label: String,
) -> Result<()> {
  let (viewer, own) = resolve_viewer(source.as_ref(), email).await;
  info!(email = %viewer.email, id = ?viewer.id, source = %source_label, "starting");

  let (width, _) = crossterm::terminal::size().context("reading terminal size")?;
  let mut app = App::new(source, viewer, own, cache, source_label, f32::from(width)).await;

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
    .context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture).ok();
  terminal.show_cursor().ok();

  if app.signed_out {
    println!("Signed out of {}.", app.viewer.email);
  }
  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop<S: ProfileSource + 'static>(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<S>,
) -> Result<()> {
  loop {
    app.tick(Instant::now()).await;
    terminal
      .draw(|f| ui::draw(f, app, Instant::now()))
      .context("drawing frame")?;

    // Short poll keeps swipe animations moving between inputs.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(16))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    match maybe_event {
      Some(Event::Key(key)) => {
        if !app.handle_key(key, Instant::now()).await {
          break;
        }
      }
      Some(Event::Mouse(mouse)) => app.handle_mouse(mouse, Instant::now()),
      Some(Event::Resize(width, _)) => app.resize(width),
      _ => {}
    }
  }

  Ok(())
}
