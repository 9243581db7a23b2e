//! Error type for `whosthat-pokeapi`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  #[error("GET {url} failed: {source}")]
  Request {
    url:    String,
    #[source]
    source: reqwest::Error,
  },

  #[error("GET {url} → {status}")]
  Status {
    url:    String,
    status: reqwest::StatusCode,
  },

  #[error("could not decode {url}: {source}")]
  Decode {
    url:    String,
    #[source]
    source: serde_json::Error,
  },

  #[error("the catalog lists no entries")]
  EmptyCatalog,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
