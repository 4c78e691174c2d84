//! [`SqliteStore`] — the SQLite implementation of [`ProfileSource`] and
//! [`LocalCache`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use spark_core::{
  cache::LocalCache,
  profile::{ProfileId, RawProfile, fields},
  source::ProfileSource,
  subscription::{ListenerRegistry, OnData, OnError, Subscription},
};

use crate::{Error, Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Profile documents and the local cache in a single SQLite file.
///
/// Cloning is cheap; the connection and the listener registry are both
/// reference-counted. Listeners registered through
/// [`ProfileSource::subscribe_profile`] fire after every write to their
/// profile made through any clone.
#[derive(Clone)]
pub struct SqliteStore {
  conn:      tokio_rusqlite::Connection,
  listeners: ListenerRegistry<ProfileId, RawProfile>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn, listeners: ListenerRegistry::new() })
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  /// Insert or replace a profile document and notify its listeners.
  pub async fn upsert_profile(&self, profile: RawProfile) -> Result<()> {
    let id_str    = profile.id.to_string();
    let data_str  = serde_json::to_string(&profile.fields)?;
    let at_str    = Utc::now().to_rfc3339();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (profile_id, data_json, updated_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (profile_id) DO UPDATE
             SET data_json = excluded.data_json, updated_at = excluded.updated_at",
          rusqlite::params![id_str, data_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    let notified = self.listeners.publish(&profile.id, &profile);
    debug!(profile = %profile.id, notified, "profile written");
    Ok(())
  }

  /// Retrieve one profile document. Returns `None` if not found.
  pub async fn get_profile(&self, id: &ProfileId) -> Result<Option<RawProfile>> {
    let id_str = id.to_string();

    let row: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT profile_id, data_json FROM profiles WHERE profile_id = ?1",
            rusqlite::params![id_str],
            |row| Ok((row.get(0)?, row.get(1)?)),
          )
          .optional()?)
      })
      .await?;

    row.map(decode_profile).transpose()
  }

  /// Delete a profile document. Returns whether it existed.
  pub async fn delete_profile(&self, id: &ProfileId) -> Result<bool> {
    let id_str = id.to_string();
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM profiles WHERE profile_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;
    Ok(removed > 0)
  }

  /// Import a JSON array of profile objects. Objects without an `id` are
  /// given a fresh UUID. Returns the number of profiles written.
  pub async fn import_json(&self, json: &str) -> Result<usize> {
    let Value::Array(items) = serde_json::from_str::<Value>(json)? else {
      return Err(Error::NotAnArray);
    };

    let mut written = 0;
    for mut item in items {
      if let Value::Object(obj) = &mut item
        && !obj.contains_key(fields::ID)
      {
        obj.insert(fields::ID.into(), Value::String(Uuid::new_v4().to_string()));
      }
      self.upsert_profile(RawProfile::from_value(item)?).await?;
      written += 1;
    }

    info!(written, "imported profiles");
    Ok(written)
  }
}

fn decode_profile((id, data): (String, String)) -> Result<RawProfile> {
  match serde_json::from_str::<Value>(&data)? {
    Value::Object(map) => Ok(RawProfile::new(id, map)),
    _ => Err(Error::CorruptProfile(id)),
  }
}

// ─── ProfileSource impl ──────────────────────────────────────────────────────

impl ProfileSource for SqliteStore {
  type Error = Error;

  async fn fetch_all_profiles(&self) -> Result<Vec<RawProfile>> {
    let rows: Vec<(String, String)> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT profile_id, data_json FROM profiles ORDER BY profile_id")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows.into_iter().map(decode_profile).collect()
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

// ─── LocalCache impl ─────────────────────────────────────────────────────────

impl LocalCache for SqliteStore {
  type Error = Error;

  async fn get(&self, key: &str) -> Result<Option<String>> {
    let key = key.to_owned();
    let value: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT value FROM cache WHERE key = ?1",
            rusqlite::params![key],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;
    Ok(value)
  }

  async fn set(&self, key: &str, value: &str) -> Result<()> {
    let key    = key.to_owned();
    let value  = value.to_owned();
    let at_str = Utc::now().to_rfc3339();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO cache (key, value, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT (key) DO UPDATE
             SET value = excluded.value, updated_at = excluded.updated_at",
          rusqlite::params![key, value, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn remove(&self, key: &str) -> Result<()> {
    let key = key.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM cache WHERE key = ?1", rusqlite::params![key])?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
