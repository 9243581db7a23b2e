//! Response caches for catalog lookups.
//!
//! Two backends implement [`ResponseCache`]: [`MemoryCache`] for a single
//! process lifetime and [`SqliteCache`], which wraps [`tokio_rusqlite`] so
//! entries survive restarts without blocking the async runtime. [`Cache`]
//! picks one at runtime.

mod memory;
mod schema;
mod sqlite;

pub mod error;

pub use error::{Error, Result};
pub use memory::MemoryCache;
pub use sqlite::SqliteCache;
use whosthat_core::provider::ResponseCache;

/// Either backend, chosen from configuration.
#[derive(Clone)]
pub enum Cache {
  Memory(MemoryCache),
  Sqlite(SqliteCache),
}

impl ResponseCache for Cache {
  type Error = Error;

  async fn get(&self, key: &str) -> Result<Option<String>> {
    match self {
      Self::Memory(cache) => cache.get(key).await,
      Self::Sqlite(cache) => cache.get(key).await,
    }
  }

  async fn set(&self, key: &str, value: String) -> Result<()> {
    match self {
      Self::Memory(cache) => cache.set(key, value).await,
      Self::Sqlite(cache) => cache.set(key, value).await,
    }
  }
}

impl From<MemoryCache> for Cache {
  fn from(cache: MemoryCache) -> Self { Self::Memory(cache) }
}

impl From<SqliteCache> for Cache {
  fn from(cache: SqliteCache) -> Self { Self::Sqlite(cache) }
}

#[cfg(test)]
mod tests;
