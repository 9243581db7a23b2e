//! [`MemoryCache`]: a process-local cache.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
  time::Duration,
};

use tokio::time::Instant;
use whosthat_core::provider::ResponseCache;

use crate::{Error, Result};

struct Entry {
  value:      String,
  expires_at: Instant,
}

/// An in-memory TTL cache. Expired entries are dropped when read or when
/// [`MemoryCache::purge_expired`] runs.
///
/// Cloning is cheap; clones share entries.
#[derive(Clone)]
pub struct MemoryCache {
  entries: Arc<Mutex<HashMap<String, Entry>>>,
  ttl:     Duration,
}

impl MemoryCache {
  pub fn new(ttl: Duration) -> Self {
    Self { entries: Arc::default(), ttl }
  }

  /// Remove every expired entry, returning how many were removed.
  pub fn purge_expired(&self) -> Result<usize> {
    let now = Instant::now();
    let mut entries = self.entries.lock().map_err(|_| Error::Poisoned)?;
    let before = entries.len();
    entries.retain(|_, e| e.expires_at > now);
    Ok(before - entries.len())
  }

  /// Number of stored entries, expired or not.
  pub fn len(&self) -> Result<usize> {
    Ok(self.entries.lock().map_err(|_| Error::Poisoned)?.len())
  }

  pub fn is_empty(&self) -> Result<bool> { Ok(self.len()? == 0) }
}

impl ResponseCache for MemoryCache {
  type Error = Error;

  async fn get(&self, key: &str) -> Result<Option<String>> {
    let now = Instant::now();
    let mut entries = self.entries.lock().map_err(|_| Error::Poisoned)?;
    match entries.get(key) {
      Some(e) if e.expires_at > now => Ok(Some(e.value.clone())),
      Some(_) => {
        entries.remove(key);
        Ok(None)
      }
      None => Ok(None),
    }
  }

  async fn set(&self, key: &str, value: String) -> Result<()> {
    let expires_at = Instant::now() + self.ttl;
    self
      .entries
      .lock()
      .map_err(|_| Error::Poisoned)?
      .insert(key.to_owned(), Entry { value, expires_at });
    Ok(())
  }
}
