//! Identities, inbound guesses and the events a round emits.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{hint::Hint, subject::Subject};

/// Opaque chat channel identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

/// Opaque message author identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Author(pub String);

impl fmt::Display for ChannelId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl fmt::Display for Author {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// A message received from the chat transport. Mention detection and text
/// clean-up have already been done by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
  pub channel:   ChannelId,
  pub author:    Author,
  pub text:      String,
  /// Whether the message addresses the bot directly.
  pub mentioned: bool,
}

/// A candidate answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessAttempt {
  pub author: Author,
  pub text:   String,
}

impl From<InboundMessage> for GuessAttempt {
  fn from(msg: InboundMessage) -> Self {
    Self { author: msg.author, text: msg.text }
  }
}

/// Everything a round (or the session wrapping it) can report.
///
/// A round always starts with [`RoundEvent::FetchingSubject`] and ends with
/// exactly one terminal event: [`RoundEvent::CorrectAnswer`],
/// [`RoundEvent::Timeout`] or [`RoundEvent::Error`].
#[derive(Debug, Clone)]
pub enum RoundEvent {
  FetchingSubject,
  Question {
    subject: Arc<Subject>,
    text:    String,
  },
  Hint {
    subject: Arc<Subject>,
    hint:    Hint,
  },
  CorrectAnswer {
    subject: Arc<Subject>,
    author:  Author,
  },
  Timeout {
    subject: Arc<Subject>,
  },
  Error {
    cause: String,
  },
  /// Emitted by the session once its round budget is spent.
  RoundsExhausted,
}

impl RoundEvent {
  pub fn is_terminal(&self) -> bool {
    matches!(
      self,
      Self::CorrectAnswer { .. } | Self::Timeout { .. } | Self::Error { .. }
    )
  }
}
