//! [`SqliteCache`]: the persistent cache backend.

use std::{path::Path, time::Duration};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use sha2::{Digest, Sha256};
use tracing::debug;
use whosthat_core::provider::ResponseCache;

use crate::{Result, schema::SCHEMA};

/// A response cache backed by a single SQLite file.
///
/// Keys are stored as their SHA-256 digest, so arbitrarily long request URLs
/// index uniformly. Cloning is cheap: the inner connection is
/// reference-counted.
#[derive(Clone)]
pub struct SqliteCache {
  conn: tokio_rusqlite::Connection,
  ttl:  Duration,
}

impl SqliteCache {
  /// Open (or create) a cache at `path`, run schema initialisation and
  /// drop whatever expired since the file was last used.
  pub async fn open(path: impl AsRef<Path>, ttl: Duration) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let cache = Self { conn, ttl };
    cache.init_schema().await?;
    cache.purge_expired().await?;
    Ok(cache)
  }

  /// Open an in-memory cache, useful for testing.
  pub async fn open_in_memory(ttl: Duration) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let cache = Self { conn, ttl };
    cache.init_schema().await?;
    Ok(cache)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Delete every expired row, returning how many were deleted.
  pub async fn purge_expired(&self) -> Result<usize> {
    let now = now_millis();
    let purged = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM responses WHERE expires_at <= ?1",
          rusqlite::params![now],
        )?;
        Ok(n)
      })
      .await?;
    debug!(purged, "purged expired cache entries");
    Ok(purged)
  }

  /// Number of stored rows, expired or not.
  pub async fn len(&self) -> Result<usize> {
    let n = self
      .conn
      .call(|conn| {
        let n: i64 =
          conn.query_row("SELECT COUNT(*) FROM responses", [], |r| r.get(0))?;
        Ok(n)
      })
      .await?;
    Ok(usize::try_from(n).unwrap_or_default())
  }

  pub async fn is_empty(&self) -> Result<bool> { Ok(self.len().await? == 0) }

  fn ttl_millis(&self) -> i64 {
    i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
  }
}

impl ResponseCache for SqliteCache {
  type Error = crate::Error;

  async fn get(&self, key: &str) -> Result<Option<String>> {
    let digest = digest(key);
    let now = now_millis();
    let value = self
      .conn
      .call(move |conn| {
        let value: Option<String> = conn
          .query_row(
            "SELECT value FROM responses WHERE key = ?1 AND expires_at > ?2",
            rusqlite::params![digest, now],
            |r| r.get(0),
          )
          .optional()?;
        Ok(value)
      })
      .await?;
    Ok(value)
  }

  async fn set(&self, key: &str, value: String) -> Result<()> {
    let digest = digest(key);
    let now = Utc::now();
    let stored_at = now.to_rfc3339();
    let expires_at = now.timestamp_millis().saturating_add(self.ttl_millis());
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO responses (key, value, stored_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(key) DO UPDATE SET
             value      = excluded.value,
             stored_at  = excluded.stored_at,
             expires_at = excluded.expires_at",
          rusqlite::params![digest, value, stored_at, expires_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Lowercase hex SHA-256 of `key`.
pub(crate) fn digest(key: &str) -> String {
  hex::encode(Sha256::digest(key.as_bytes()))
}

fn now_millis() -> i64 { Utc::now().timestamp_millis() }
