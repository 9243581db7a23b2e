//! Runtime configuration, deserialised from `whosthat.toml` and `WHOSTHAT_*`
//! environment variables.

use std::{path::PathBuf, time::Duration};

use config::{ConfigError, Environment, Source};
use serde::Deserialize;
use whosthat_core::hint::{HintKind, HintPipeline, RevealRange};
use whosthat_engine::GameConfig;
use whosthat_pokeapi::DEFAULT_BASE_URL;

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
  /// The handle players mention to address the bot, e.g. `@whosthat`.
  pub bot_name:  String,
  /// Author allowed to request an invite link.
  #[serde(default)]
  pub owner:     Option<String>,
  #[serde(default)]
  pub client_id: Option<String>,
  #[serde(default = "default_language")]
  pub language:  String,
  #[serde(default)]
  pub game:      GameSettings,
  #[serde(default)]
  pub api:       ApiSettings,
  #[serde(default)]
  pub cache:     CacheSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameSettings {
  pub rounds:         usize,
  pub round_secs:     u64,
  pub grace_ms:       u64,
  pub fetch_attempts: u32,
  pub fetch_retry_ms: u64,
  /// Hint tags in reveal order.
  pub hints:          Vec<String>,
  pub reveal_min:     f64,
  pub reveal_max:     f64,
  pub seed:           Option<u64>,
}

impl Default for GameSettings {
  fn default() -> Self {
    let game = GameConfig::default();
    let reveal = RevealRange::default();
    Self {
      rounds:         game.rounds,
      round_secs:     game.round_duration.as_secs(),
      grace_ms:       millis(game.grace),
      fetch_attempts: game.fetch_attempts,
      fetch_retry_ms: millis(game.fetch_retry_delay),
      hints:          vec![HintKind::PartialName.to_string(); 4],
      reveal_min:     reveal.min,
      reveal_max:     reveal.max,
      seed:           None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
  pub base_url:     String,
  pub timeout_secs: u64,
}

impl Default for ApiSettings {
  fn default() -> Self {
    Self { base_url: DEFAULT_BASE_URL.to_owned(), timeout_secs: 30 }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
  #[default]
  Memory,
  Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
  pub backend:  CacheBackend,
  /// SQLite file; a leading `~` is expanded.
  pub path:     PathBuf,
  pub ttl_secs: u64,
}

impl Default for CacheSettings {
  fn default() -> Self {
    Self {
      backend:  CacheBackend::Memory,
      path:     PathBuf::from("~/.cache/whosthat/responses.sqlite3"),
      ttl_secs: 6 * 60 * 60,
    }
  }
}

fn default_language() -> String { "en".to_owned() }

fn millis(d: Duration) -> u64 { u64::try_from(d.as_millis()).unwrap_or(u64::MAX) }

impl BotConfig {
  /// Layer `file` under `WHOSTHAT_*` environment variables. Nested keys use
  /// a double underscore: `WHOSTHAT_GAME__ROUNDS=10`.
  pub fn load<S>(file: S) -> Result<Self, ConfigError>
  where
    S: Source + Send + Sync + 'static,
  {
    config::Config::builder()
      .add_source(file)
      .add_source(
        Environment::with_prefix("WHOSTHAT")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  /// The mention handle, always with its leading `@`.
  pub fn handle(&self) -> String {
    let name = self.bot_name.trim();
    if name.starts_with('@') {
      name.to_owned()
    } else {
      format!("@{name}")
    }
  }

  pub fn game_config(&self) -> GameConfig {
    let g = &self.game;
    let config = GameConfig::default()
      .with_rounds(g.rounds)
      .with_round_duration(Duration::from_secs(g.round_secs))
      .with_grace(Duration::from_millis(g.grace_ms))
      .with_fetch_attempts(g.fetch_attempts)
      .with_fetch_retry_delay(Duration::from_millis(g.fetch_retry_ms))
      .with_pipeline(HintPipeline::new(g.hints.iter().cloned()))
      .with_reveal(RevealRange { min: g.reveal_min, max: g.reveal_max })
      .with_language(self.language.clone());
    match g.seed {
      Some(seed) => config.with_seed(seed),
      None => config,
    }
  }

  pub fn cache_ttl(&self) -> Duration { Duration::from_secs(self.cache.ttl_secs) }

  pub fn api_timeout(&self) -> Duration { Duration::from_secs(self.api.timeout_secs) }
}

#[cfg(test)]
mod tests {
  use config::{File, FileFormat};

  use super::*;

  fn parse(toml: &str) -> Result<BotConfig, ConfigError> {
    BotConfig::load(File::from_str(toml, FileFormat::Toml))
  }

  #[test]
  fn minimal_file_uses_defaults() {
    let cfg = parse(r#"bot_name = "whosthat""#).unwrap();

    assert_eq!(cfg.handle(), "@whosthat");
    assert_eq!(cfg.language, "en");
    assert_eq!(cfg.owner, None);
    assert_eq!(cfg.cache.backend, CacheBackend::Memory);
    assert_eq!(cfg.cache_ttl(), Duration::from_secs(21_600));
    assert_eq!(cfg.api.base_url, "https://pokeapi.co/api/v2");

    let game = cfg.game_config();
    assert_eq!(game.rounds, 50);
    assert_eq!(game.round_duration, Duration::from_secs(25));
    assert_eq!(game.grace, Duration::from_millis(10));
    assert_eq!(game.fetch_attempts, 3);
    assert_eq!(game.pipeline, HintPipeline::repeated(HintKind::PartialName, 4));
    assert_eq!(game.seed, None);
  }

  #[test]
  fn full_file_overrides_everything() {
    let cfg = parse(
      r#"
        bot_name  = "@quizzer"
        owner     = "oak"
        client_id = "1234"
        language  = "de"

        [game]
        rounds     = 3
        round_secs = 40
        hints      = ["category", "description", "partial_name"]
        seed       = 7

        [cache]
        backend  = "sqlite"
        path     = "/tmp/whosthat.sqlite3"
        ttl_secs = 60
      "#,
    )
    .unwrap();

    assert_eq!(cfg.handle(), "@quizzer");
    assert_eq!(cfg.owner.as_deref(), Some("oak"));
    assert_eq!(cfg.cache.backend, CacheBackend::Sqlite);

    let game = cfg.game_config();
    assert_eq!(game.rounds, 3);
    assert_eq!(game.language, "de");
    assert_eq!(game.pipeline.len(), 3);
    assert_eq!(game.hint_interval(), Duration::from_secs(10));
    assert_eq!(game.seed, Some(7));
  }

  #[test]
  fn bot_name_is_required() {
    assert!(parse("language = \"en\"").is_err());
  }

  #[test]
  fn unknown_cache_backend_is_rejected() {
    let err = parse("bot_name = \"x\"\n[cache]\nbackend = \"redis\"").unwrap_err();
    assert!(err.to_string().contains("redis"), "{err}");
  }
}
