//! Owner-only invite links.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};
use whosthat_core::{
  event::{Author, InboundMessage},
  provider::Transport,
};
use whosthat_engine::Intent;

/// The link that adds the bot to a server.
pub fn invite_url(client_id: &str) -> String {
  format!(
    "https://discordapp.com/oauth2/authorize?&client_id={client_id}&scope=bot&permissions=0"
  )
}

/// Answers `invite` requests from the configured owner with a direct
/// message. Does nothing unless both an owner and a client id are set.
#[derive(Debug, Clone)]
pub struct InviteResponder {
  owner:     Option<Author>,
  client_id: Option<String>,
}

impl InviteResponder {
  pub fn new(owner: Option<Author>, client_id: Option<String>) -> Self {
    Self { owner, client_id }
  }

  pub fn enabled(&self) -> bool { self.owner.is_some() && self.client_id.is_some() }

  /// The reply owed to `msg`, if any.
  pub fn reply(&self, msg: &InboundMessage) -> Option<String> {
    let owner = self.owner.as_ref()?;
    let client_id = self.client_id.as_deref()?;
    let asked = msg.mentioned
      && msg.author == *owner
      && Intent::parse(&msg.text) == Some(Intent::Invite);
    asked.then(|| format!("Here's an invite URL: {}", invite_url(client_id)))
  }

  /// Watch the inbound bus until it closes.
  pub async fn run<T: Transport>(
    self,
    mut rx: broadcast::Receiver<InboundMessage>,
    transport: Arc<T>,
  ) {
    loop {
      let msg = match rx.recv().await {
        Ok(msg) => msg,
        Err(RecvError::Lagged(dropped)) => {
          warn!(dropped, "invite responder lagged");
          continue;
        }
        Err(RecvError::Closed) => break,
      };
      let Some(reply) = self.reply(&msg) else { continue };
      match transport.send_direct(&msg.author, &reply).await {
        Ok(()) => info!(author = %msg.author, "invite sent"),
        Err(e) => warn!(author = %msg.author, error = %e, "failed to send invite"),
      }
    }
  }
}
