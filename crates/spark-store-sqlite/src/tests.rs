//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::{Arc, Mutex};

use serde_json::json;
use spark_core::{
  cache::{LocalCache, PROFILE_BACKGROUND_KEY},
  profile::{ProfileId, RawProfile},
  source::ProfileSource,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn profile(id: &str, first: &str) -> RawProfile {
  RawProfile::from_value(json!({ "id": id, "firstName": first })).unwrap()
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_and_fetch_all() {
  let s = store().await;
  s.upsert_profile(profile("b", "Ben")).await.unwrap();
  s.upsert_profile(profile("a", "Ana")).await.unwrap();

  let all = s.fetch_all_profiles().await.unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(all[0].id.as_str(), "a");
  assert_eq!(all[0].fields["firstName"], "Ana");
}

#[tokio::test]
async fn upsert_replaces_existing_document() {
  let s = store().await;
  s.upsert_profile(profile("a", "Ana")).await.unwrap();
  s.upsert_profile(profile("a", "Anna")).await.unwrap();

  let all = s.fetch_all_profiles().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].fields["firstName"], "Anna");
}

#[tokio::test]
async fn get_and_delete_profile() {
  let s = store().await;
  let id = ProfileId::from("a");
  assert!(s.get_profile(&id).await.unwrap().is_none());

  s.upsert_profile(profile("a", "Ana")).await.unwrap();
  let got = s.get_profile(&id).await.unwrap().unwrap();
  assert_eq!(got, profile("a", "Ana"));

  assert!(s.delete_profile(&id).await.unwrap());
  assert!(!s.delete_profile(&id).await.unwrap());
  assert!(s.fetch_all_profiles().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_store_fetches_nothing() {
  let s = store().await;
  assert!(s.fetch_all_profiles().await.unwrap().is_empty());
}

// ─── Import ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn import_assigns_missing_ids() {
  let s = store().await;
  let written = s
    .import_json(r#"[{ "id": "x", "firstName": "Xia" }, { "firstName": "Noid" }]"#)
    .await
    .unwrap();
  assert_eq!(written, 2);

  let all = s.fetch_all_profiles().await.unwrap();
  assert_eq!(all.len(), 2);
  assert!(all.iter().any(|p| p.id.as_str() == "x"));
  assert!(all.iter().all(|p| !p.id.as_str().is_empty()));
}

#[tokio::test]
async fn import_rejects_non_arrays() {
  let s = store().await;
  assert!(matches!(
    s.import_json(r#"{ "id": "x" }"#).await,
    Err(Error::NotAnArray)
  ));
  assert!(matches!(s.import_json("[1]").await, Err(Error::Core(_))));
  assert!(matches!(s.import_json("not json").await, Err(Error::Json(_))));
}

// ─── Listeners ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn listeners_see_writes_until_unsubscribed() {
  let s = store().await;
  let seen = Arc::new(Mutex::new(Vec::new()));
  let sink = Arc::clone(&seen);

  let sub = s.subscribe_profile(
    &ProfileId::from("a"),
    Box::new(move |p: RawProfile| {
      sink.lock().unwrap().push(p.fields["firstName"].clone());
    }),
    Box::new(|_| {}),
  );

  s.upsert_profile(profile("a", "Ana")).await.unwrap();
  s.upsert_profile(profile("b", "Ben")).await.unwrap();
  // A clone shares the registry.
  s.clone().upsert_profile(profile("a", "Anna")).await.unwrap();
  assert_eq!(*seen.lock().unwrap(), vec![json!("Ana"), json!("Anna")]);

  drop(sub);
  s.upsert_profile(profile("a", "Annie")).await.unwrap();
  assert_eq!(seen.lock().unwrap().len(), 2);
}

// ─── Cache ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn cache_set_get_remove() {
  let s = store().await;
  assert_eq!(s.get(PROFILE_BACKGROUND_KEY).await.unwrap(), None);

  s.set(PROFILE_BACKGROUND_KEY, "#112233").await.unwrap();
  s.set(PROFILE_BACKGROUND_KEY, "#445566").await.unwrap();
  assert_eq!(
    s.get(PROFILE_BACKGROUND_KEY).await.unwrap().as_deref(),
    Some("#445566")
  );

  s.remove(PROFILE_BACKGROUND_KEY).await.unwrap();
  assert_eq!(s.get(PROFILE_BACKGROUND_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn cache_survives_reopen() {
  let dir = std::env::temp_dir().join(format!("spark-cache-{}", uuid::Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("spark.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.set("k", "v").await.unwrap();
  }
  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.get("k").await.unwrap().as_deref(), Some("v"));

  drop(s);
  std::fs::remove_dir_all(&dir).ok();
}
