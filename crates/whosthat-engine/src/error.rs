//! Error type for `whosthat-engine`.

use thiserror::Error;

/// Why a round failed. Rendered into `RoundEvent::Error` and never propagated
/// past the round engine.
#[derive(Debug, Error)]
pub enum Error {
  #[error("could not fetch a subject after {attempts} attempts: {source}")]
  Fetch {
    attempts: u32,
    #[source]
    source:   Box<dyn std::error::Error + Send + Sync>,
  },

  #[error(transparent)]
  Core(#[from] whosthat_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
