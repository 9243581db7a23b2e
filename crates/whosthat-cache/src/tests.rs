//! Tests for both cache backends.

use std::time::Duration;

use whosthat_core::provider::ResponseCache;

use crate::{Cache, MemoryCache, SqliteCache, sqlite::digest};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);
const URL: &str = "https://pokeapi.co/api/v2/pokemon/25";

async fn sqlite(ttl: Duration) -> SqliteCache {
  SqliteCache::open_in_memory(ttl)
    .await
    .expect("in-memory cache")
}

// ─── Keys ────────────────────────────────────────────────────────────────────

#[test]
fn digest_is_lowercase_sha256_hex() {
  assert_eq!(
    digest(""),
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
  );
  assert_eq!(digest(URL).len(), 64);
  assert_ne!(digest(URL), digest("https://pokeapi.co/api/v2/pokemon/26"));
}

// ─── SQLite ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sqlite_miss_then_hit() {
  let cache = sqlite(DAY).await;

  assert_eq!(cache.get(URL).await.unwrap(), None);
  cache.set(URL, r#"{"id":25}"#.into()).await.unwrap();
  assert_eq!(cache.get(URL).await.unwrap().as_deref(), Some(r#"{"id":25}"#));
}

#[tokio::test]
async fn sqlite_set_overwrites() {
  let cache = sqlite(DAY).await;

  cache.set(URL, "old".into()).await.unwrap();
  cache.set(URL, "new".into()).await.unwrap();

  assert_eq!(cache.get(URL).await.unwrap().as_deref(), Some("new"));
  assert_eq!(cache.len().await.unwrap(), 1);
}

#[tokio::test]
async fn sqlite_expired_entries_are_invisible_and_purgeable() {
  let cache = sqlite(Duration::ZERO).await;

  cache.set(URL, "stale".into()).await.unwrap();
  assert_eq!(cache.get(URL).await.unwrap(), None);
  assert_eq!(cache.len().await.unwrap(), 1);

  assert_eq!(cache.purge_expired().await.unwrap(), 1);
  assert!(cache.is_empty().await.unwrap());
}

#[tokio::test]
async fn sqlite_persists_across_connections() {
  let dir = scratch_dir("persist");
  let path = dir.join("cache.sqlite3");
  let _ = std::fs::remove_file(&path);

  {
    let cache = SqliteCache::open(&path, DAY).await.unwrap();
    cache.set(URL, "pikachu".into()).await.unwrap();
  }
  let reopened = SqliteCache::open(&path, DAY).await.unwrap();
  assert_eq!(reopened.get(URL).await.unwrap().as_deref(), Some("pikachu"));

  drop(reopened);
  let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn sqlite_open_drops_expired_rows() {
  let dir = scratch_dir("reopen");
  let path = dir.join("cache.sqlite3");
  let _ = std::fs::remove_file(&path);

  {
    let cache = SqliteCache::open(&path, Duration::ZERO).await.unwrap();
    cache.set(URL, "stale".into()).await.unwrap();
    assert_eq!(cache.len().await.unwrap(), 1);
  }
  let reopened = SqliteCache::open(&path, DAY).await.unwrap();
  assert!(reopened.is_empty().await.unwrap());

  drop(reopened);
  let _ = std::fs::remove_dir_all(&dir);
}

fn scratch_dir(name: &str) -> std::path::PathBuf {
  let dir = std::env::temp_dir()
    .join(format!("whosthat-cache-{}-{name}", std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  dir
}

// ─── Memory ──────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn memory_entries_expire_after_ttl() {
  let cache = MemoryCache::new(Duration::from_secs(60));
  cache.set(URL, "pikachu".into()).await.unwrap();

  tokio::time::advance(Duration::from_secs(59)).await;
  assert_eq!(cache.get(URL).await.unwrap().as_deref(), Some("pikachu"));

  tokio::time::advance(Duration::from_secs(1)).await;
  assert_eq!(cache.get(URL).await.unwrap(), None);
  assert!(cache.is_empty().unwrap());
}

#[tokio::test(start_paused = true)]
async fn memory_purge_keeps_live_entries() {
  let cache = MemoryCache::new(Duration::from_secs(60));
  cache.set("a", "1".into()).await.unwrap();
  tokio::time::advance(Duration::from_secs(30)).await;
  cache.set("b", "2".into()).await.unwrap();
  tokio::time::advance(Duration::from_secs(45)).await;

  assert_eq!(cache.purge_expired().unwrap(), 1);
  assert_eq!(cache.len().unwrap(), 1);
  assert_eq!(cache.get("b").await.unwrap().as_deref(), Some("2"));
}

#[tokio::test]
async fn memory_clones_share_entries() {
  let cache = MemoryCache::new(DAY);
  let clone = cache.clone();
  clone.set(URL, "shared".into()).await.unwrap();
  assert_eq!(cache.get(URL).await.unwrap().as_deref(), Some("shared"));
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn cache_enum_delegates_to_backend() {
  for cache in [
    Cache::from(MemoryCache::new(DAY)),
    Cache::from(sqlite(DAY).await),
  ] {
    assert_eq!(cache.get(URL).await.unwrap(), None);
    cache.set(URL, "x".into()).await.unwrap();
    assert_eq!(cache.get(URL).await.unwrap().as_deref(), Some("x"));
  }
}
