//! Error types for `whosthat-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown hint kind: {0:?}")]
  UnknownHintKind(String),

  #[error("subject has no description in language {language:?}")]
  MissingDescription { language: String },

  #[error("subject has no {0} to build a hint from")]
  MissingAttribute(&'static str),

  #[error("lookup failed: {0}")]
  Lookup(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
