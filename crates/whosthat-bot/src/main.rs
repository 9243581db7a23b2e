//! whosthat bot binary.
//!
//! Reads `whosthat.toml` (or the path given with `--config`) layered under
//! `WHOSTHAT_*` environment variables, then plays the quiz over the console:
//! chat lines arrive on stdin and replies go to stdout. Logs go to stderr.
//! Input is read on a blocking thread, so piped input shuts down cleanly
//! while an interactive terminal may need one more line after Ctrl-C.
//!
//! ```text
//! [#general] oak: @whosthat start
//! [#general] ash: pikachu!
//! [#general] oak: @whosthat stop
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use tokio::{io::BufReader, sync::mpsc};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;
use whosthat_bot::{
  BotConfig, ConsoleTransport, InviteResponder, console,
  invite::invite_url,
  settings::CacheBackend,
};
use whosthat_cache::{Cache, MemoryCache, SqliteCache};
use whosthat_core::event::Author;
use whosthat_engine::Controller;
use whosthat_pokeapi::PokeApi;

/// Inbound lines buffered between the console reader and the controller.
const INBOUND_BUFFER: usize = 64;

#[derive(Parser)]
#[command(author, version, about = "Who's that Pokémon!? quiz bot")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "whosthat.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr; stdout carries the chat.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let cfg = BotConfig::load(config::File::from(cli.config.as_path()).required(false))
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  match &cfg.client_id {
    Some(client_id) => info!("Invite URL: {}", invite_url(client_id)),
    None => info!(
      "client_id not set; no invite URL will be generated and `invite` is ignored"
    ),
  }

  let cache = open_cache(&cfg).await?;
  let provider = PokeApi::new(cfg.api.base_url.clone(), cfg.api_timeout(), cache)
    .context("failed to build catalog client")?;
  let transport = Arc::new(ConsoleTransport::new(tokio::io::stdout()));

  let controller =
    Controller::new(Arc::new(provider), Arc::clone(&transport), cfg.game_config());

  let invites = InviteResponder::new(cfg.owner.clone().map(Author), cfg.client_id.clone());
  let invite_task = invites
    .enabled()
    .then(|| tokio::spawn(invites.run(controller.subscribe(), Arc::clone(&transport))));

  let (tx, rx) = mpsc::channel(INBOUND_BUFFER);
  let reader = tokio::spawn(console::read_inbound(
    BufReader::new(tokio::io::stdin()),
    cfg.handle(),
    tx,
  ));

  // Closing the input ends the controller, which stops every session.
  let stop_reading = reader.abort_handle();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      info!("interrupt received, shutting down");
      stop_reading.abort();
    }
  });

  info!(handle = %cfg.handle(), "listening on stdin");
  controller.run(rx).await;

  match reader.await {
    Ok(result) => result.context("failed to read stdin")?,
    Err(e) if e.is_cancelled() => {}
    Err(e) => return Err(e).context("console reader failed"),
  }
  if let Some(task) = invite_task {
    task.await.context("invite responder failed")?;
  }

  info!("bye");
  Ok(())
}

async fn open_cache(cfg: &BotConfig) -> anyhow::Result<Cache> {
  let settings = &cfg.cache;
  let ttl = cfg.cache_ttl();
  let cache: Cache = match settings.backend {
    CacheBackend::Memory => MemoryCache::new(ttl).into(),
    CacheBackend::Sqlite => {
      let path = expand_tilde(&settings.path);
      if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
          .with_context(|| format!("failed to create cache directory {dir:?}"))?;
      }
      SqliteCache::open(&path, ttl)
        .await
        .with_context(|| format!("failed to open cache at {path:?}"))?
        .into()
    }
  };
  info!(backend = ?settings.backend, ttl_secs = ttl.as_secs(), "response cache ready");
  Ok(cache)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
