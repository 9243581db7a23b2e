//! Engine configuration.

use std::time::Duration;

use whosthat_core::hint::{HintKind, HintPipeline, RevealRange};

/// Tunables for rounds and sessions.
#[derive(Debug, Clone)]
pub struct GameConfig {
  /// Maximum rounds per session.
  pub rounds:            usize,
  /// Time players have to answer; hints are spread evenly across it.
  pub round_duration:    Duration,
  /// Quiet period after a round resolves before the next one may start.
  pub grace:             Duration,
  /// Total subject fetch attempts before a round fails.
  pub fetch_attempts:    u32,
  pub fetch_retry_delay: Duration,
  pub pipeline:          HintPipeline,
  pub reveal:            RevealRange,
  pub language:          String,
  /// Fixed RNG seed; `None` seeds from entropy.
  pub seed:              Option<u64>,
}

impl Default for GameConfig {
  fn default() -> Self {
    Self {
      rounds:            50,
      round_duration:    Duration::from_secs(25),
      grace:             Duration::from_millis(10),
      fetch_attempts:    3,
      fetch_retry_delay: Duration::from_millis(500),
      pipeline:          HintPipeline::repeated(HintKind::PartialName, 4),
      reveal:            RevealRange::default(),
      language:          "en".to_owned(),
      seed:              None,
    }
  }
}

impl GameConfig {
  pub fn with_rounds(mut self, rounds: usize) -> Self {
    self.rounds = rounds;
    self
  }

  pub fn with_round_duration(mut self, duration: Duration) -> Self {
    self.round_duration = duration;
    self
  }

  pub fn with_grace(mut self, grace: Duration) -> Self {
    self.grace = grace;
    self
  }

  pub fn with_fetch_attempts(mut self, attempts: u32) -> Self {
    self.fetch_attempts = attempts;
    self
  }

  pub fn with_fetch_retry_delay(mut self, delay: Duration) -> Self {
    self.fetch_retry_delay = delay;
    self
  }

  pub fn with_pipeline(mut self, pipeline: HintPipeline) -> Self {
    self.pipeline = pipeline;
    self
  }

  pub fn with_reveal(mut self, reveal: RevealRange) -> Self {
    self.reveal = reveal;
    self
  }

  pub fn with_language(mut self, language: impl Into<String>) -> Self {
    self.language = language.into();
    self
  }

  pub fn with_seed(mut self, seed: u64) -> Self {
    self.seed = Some(seed);
    self
  }

  /// Interval between hint reveals. The final slot is reserved for the
  /// timeout, so `n` hints split the round into `n + 1` slots.
  pub fn hint_interval(&self) -> Duration {
    let slots = u32::try_from(self.pipeline.len() + 1).unwrap_or(u32::MAX);
    self.round_duration / slots
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_round_reveals_four_hints_every_five_seconds() {
    let cfg = GameConfig::default();
    assert_eq!(cfg.pipeline.len(), 4);
    assert_eq!(cfg.hint_interval(), Duration::from_secs(5));
  }

  #[test]
  fn empty_pipeline_uses_a_single_slot() {
    let cfg = GameConfig::default().with_pipeline(HintPipeline::default());
    assert_eq!(cfg.hint_interval(), cfg.round_duration);
  }
}
