//! Sessions: back-to-back rounds in a single channel.

use std::sync::Arc;

use rand::{RngCore, SeedableRng, rngs::StdRng};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{error, info, warn};
use whosthat_core::{
  event::{ChannelId, InboundMessage, RoundEvent},
  provider::{SubjectProvider, Transport},
};

use crate::{
  presenter::Presenter,
  round::{GuessFeed, RoundEngine, RoundOutcome},
};

/// Events buffered between a round and its session.
const EVENT_BUFFER: usize = 16;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
  /// Every round in the budget was played.
  Exhausted,
  /// A stop command (or shutdown) cancelled it.
  Stopped,
  /// A round ended in an error.
  Failed,
}

/// One channel's game: runs rounds until the budget is spent, a stop signal
/// arrives, or a round fails. Every event is rendered and delivered before
/// the next one is looked at.
pub struct Session<P, T> {
  channel:   ChannelId,
  engine:    RoundEngine<P>,
  transport: Arc<T>,
  bus:       broadcast::Sender<InboundMessage>,
  presenter: Presenter,
  rng:       StdRng,
}

impl<P, T> Session<P, T>
where
  P: SubjectProvider + 'static,
  T: Transport + 'static,
{
  pub fn new(
    channel: ChannelId,
    engine: RoundEngine<P>,
    transport: Arc<T>,
    bus: broadcast::Sender<InboundMessage>,
    rng: StdRng,
  ) -> Self {
    let presenter = Presenter::new(engine.config().language.clone());
    Self { channel, engine, transport, bus, presenter, rng }
  }

  /// Play until done. Completing or dropping the sending half of `stop`
  /// cancels the session; the round in flight is aborted and nothing more is
  /// sent for it.
  pub async fn run(mut self, mut stop: oneshot::Receiver<()>) -> SessionEnd {
    let rounds = self.engine.config().rounds;
    info!(channel = %self.channel, rounds, "session started");

    let end = self.play(rounds, &mut stop).await;
    match end {
      SessionEnd::Exhausted | SessionEnd::Failed => {
        self.deliver(&RoundEvent::RoundsExhausted).await;
      }
      SessionEnd::Stopped => {
        let text = self.presenter.stopped();
        self.send(&text).await;
      }
    }

    info!(channel = %self.channel, ?end, "session ended");
    end
  }

  async fn play(
    &mut self,
    rounds: usize,
    stop: &mut oneshot::Receiver<()>,
  ) -> SessionEnd {
    for round in 1..=rounds {
      if !matches!(stop.try_recv(), Err(oneshot::error::TryRecvError::Empty)) {
        return SessionEnd::Stopped;
      }

      let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
      let feed = GuessFeed::new(self.bus.subscribe(), self.channel.clone());
      let engine = self.engine.clone();
      let rng = StdRng::seed_from_u64(self.rng.next_u64());
      let task = tokio::spawn(async move { engine.run(feed, tx, rng).await });

      loop {
        tokio::select! {
          biased;

          _ = &mut *stop => {
            task.abort();
            info!(channel = %self.channel, round, "round cancelled");
            return SessionEnd::Stopped;
          }

          event = rx.recv() => match event {
            Some(event) => self.deliver(&event).await,
            None => break,
          },
        }
      }

      match task.await {
        Ok(RoundOutcome::Failed) => return SessionEnd::Failed,
        Ok(outcome) => info!(channel = %self.channel, round, ?outcome, "round over"),
        Err(e) => {
          error!(channel = %self.channel, round, error = %e, "round task died");
          return SessionEnd::Failed;
        }
      }
    }
    SessionEnd::Exhausted
  }

  async fn deliver(&self, event: &RoundEvent) {
    let text = self.presenter.render(event);
    self.send(&text).await;
  }

  async fn send(&self, text: &str) {
    if let Err(e) = self.transport.send(&self.channel, text).await {
      warn!(channel = %self.channel, error = %e, "failed to send message");
    }
  }
}
