//! The game controller: one session per channel, driven by inbound messages.
//!
//! The controller owns the session registry outright and runs as a single
//! task, so start/stop races resolve in arrival order without any locking.
//! Every inbound message is published on a broadcast bus; running rounds and
//! any other observers (such as the invite handler) subscribe to it.

use std::{collections::HashMap, sync::Arc};

use rand::{RngCore, SeedableRng, rngs::StdRng};
use tokio::{
  sync::{broadcast, mpsc, oneshot},
  task::JoinHandle,
};
use tracing::{debug, info, warn};
use uuid::Uuid;
use whosthat_core::{
  event::{ChannelId, InboundMessage},
  provider::{SubjectProvider, Transport},
};

use crate::{
  GameConfig,
  command::Intent,
  round::RoundEngine,
  session::{Session, SessionEnd},
};

/// Messages buffered per bus subscriber before it starts lagging.
pub const BUS_CAPACITY: usize = 256;

struct ActiveSession {
  id:   Uuid,
  /// Taken once a stop has been requested.
  stop: Option<oneshot::Sender<()>>,
  task: JoinHandle<SessionEnd>,
}

pub struct Controller<P, T> {
  engine:      RoundEngine<P>,
  transport:   Arc<T>,
  bus:         broadcast::Sender<InboundMessage>,
  sessions:    HashMap<ChannelId, ActiveSession>,
  finished_tx: mpsc::UnboundedSender<(ChannelId, Uuid)>,
  finished_rx: Option<mpsc::UnboundedReceiver<(ChannelId, Uuid)>>,
  rng:         StdRng,
}

impl<P, T> Controller<P, T>
where
  P: SubjectProvider + 'static,
  T: Transport + 'static,
{
  pub fn new(provider: Arc<P>, transport: Arc<T>, config: GameConfig) -> Self {
    let rng = match config.seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    };
    let (bus, _) = broadcast::channel(BUS_CAPACITY);
    let (finished_tx, finished_rx) = mpsc::unbounded_channel();
    Self {
      engine: RoundEngine::new(provider, Arc::new(config)),
      transport,
      bus,
      sessions: HashMap::new(),
      finished_tx,
      finished_rx: Some(finished_rx),
      rng,
    }
  }

  /// A new subscription to every inbound message, addressed or not.
  pub fn subscribe(&self) -> broadcast::Receiver<InboundMessage> {
    self.bus.subscribe()
  }

  /// Whether `channel` has a session that is still running. A finished
  /// session counts as inactive even before it has been reaped.
  pub fn is_active(&self, channel: &ChannelId) -> bool {
    self
      .sessions
      .get(channel)
      .is_some_and(|active| !active.task.is_finished())
  }

  pub fn active_sessions(&self) -> usize {
    self
      .sessions
      .values()
      .filter(|active| !active.task.is_finished())
      .count()
  }

  /// Publish `msg` and act on any control intent it carries. Returns the
  /// intent, if one was recognised.
  pub fn dispatch(&mut self, msg: InboundMessage) -> Option<Intent> {
    // Fails only when nobody is subscribed.
    let _ = self.bus.send(msg.clone());

    if !msg.mentioned {
      return None;
    }
    let intent = Intent::parse(&msg.text)?;
    debug!(channel = %msg.channel, author = %msg.author, ?intent, "command");
    match intent {
      Intent::Start => self.start(msg.channel),
      Intent::Stop => self.stop(&msg.channel),
      Intent::Invite => {}
    }
    Some(intent)
  }

  fn start(&mut self, channel: ChannelId) {
    if self.is_active(&channel) {
      debug!(%channel, "session already running; start ignored");
      return;
    }
    if let Some(done) = self.sessions.remove(&channel) {
      debug!(%channel, session = %done.id, "replacing finished session");
    }

    let id = Uuid::new_v4();
    let (stop_tx, stop_rx) = oneshot::channel();
    let session = Session::new(
      channel.clone(),
      self.engine.clone(),
      Arc::clone(&self.transport),
      self.bus.clone(),
      StdRng::seed_from_u64(self.rng.next_u64()),
    );
    let finished = self.finished_tx.clone();
    let key = channel.clone();
    let task = tokio::spawn(async move {
      let end = session.run(stop_rx).await;
      // The controller may already be gone during shutdown.
      let _ = finished.send((key, id));
      end
    });

    info!(%channel, session = %id, "session spawned");
    self.sessions.insert(channel, ActiveSession { id, stop: Some(stop_tx), task });
  }

  fn stop(&mut self, channel: &ChannelId) {
    let Some(active) = self.sessions.get_mut(channel) else {
      debug!(%channel, "no session to stop");
      return;
    };
    if let Some(stop) = active.stop.take() {
      info!(%channel, session = %active.id, "stopping session");
      let _ = stop.send(());
    }
  }

  /// Forget a finished session, unless the channel has already moved on to
  /// a newer one.
  fn reap(&mut self, channel: ChannelId, id: Uuid) {
    if self.sessions.get(&channel).is_some_and(|s| s.id == id) {
      self.sessions.remove(&channel);
      debug!(%channel, session = %id, "session reaped");
    }
  }

  /// Process inbound messages until the sender side closes, then stop every
  /// session and wait for them to finish.
  pub async fn run(mut self, mut inbound: mpsc::Receiver<InboundMessage>) {
    let Some(mut finished) = self.finished_rx.take() else {
      warn!("controller already ran");
      return;
    };

    loop {
      tokio::select! {
        msg = inbound.recv() => match msg {
          Some(msg) => {
            self.dispatch(msg);
          }
          None => break,
        },
        Some((channel, id)) = finished.recv() => self.reap(channel, id),
      }
    }

    self.shutdown().await;
  }

  /// Signal every running session to stop and wait for all of them.
  pub async fn shutdown(&mut self) {
    info!(sessions = self.sessions.len(), "shutting down");
    for active in self.sessions.values_mut() {
      if let Some(stop) = active.stop.take() {
        let _ = stop.send(());
      }
    }
    for (channel, active) in self.sessions.drain() {
      match active.task.await {
        Ok(end) => debug!(%channel, ?end, "session finished"),
        Err(e) => warn!(%channel, error = %e, "session task failed"),
      }
    }
  }
}
