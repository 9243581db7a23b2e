//! The round engine.
//!
//! One call to [`RoundEngine::run`] plays one round:
//!
//! ```text
//! Fetching ─(subject)─> Composing ──> Racing ──> Resolved ──> Ended
//!    └─(attempts exhausted)──────────────────────> Error ───┘
//! ```
//!
//! Events are pushed into an `mpsc` channel in the order consumers must see
//! them. Dropping the receiver cancels the round at its next emission; the
//! session additionally aborts the task so pending timers never fire.

use std::{collections::VecDeque, future::Future, sync::Arc};

use rand::{Rng, seq::SliceRandom};
use tokio::{
  sync::{
    broadcast::{self, error::RecvError, error::TryRecvError},
    mpsc,
  },
  time::{Instant, sleep, sleep_until},
};
use tracing::{debug, error, info, warn};
use whosthat_core::{
  event::{Author, ChannelId, GuessAttempt, InboundMessage, RoundEvent},
  hint::{Hint, HintGenerator},
  matcher,
  provider::SubjectProvider,
  subject::Subject,
};

use crate::{Error, GameConfig, Result};

/// Replaces the answer wherever it appears in the question.
pub const REDACTED: &str = "[REDACTED]";

/// How a round ended, from the session's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
  Answered(Author),
  TimedOut,
  Failed,
  /// The event receiver went away mid-round.
  Cancelled,
}

/// The receiver was dropped; stop producing events.
struct Cancelled;

// ─── Guess feed ──────────────────────────────────────────────────────────────

/// One round's view of the shared inbound message bus, scoped to a channel.
///
/// Every round holds its own subscription, so observing guesses never takes
/// them away from other subscribers.
pub struct GuessFeed {
  rx:      broadcast::Receiver<InboundMessage>,
  channel: ChannelId,
}

impl GuessFeed {
  pub fn new(rx: broadcast::Receiver<InboundMessage>, channel: ChannelId) -> Self {
    Self { rx, channel }
  }

  pub fn channel(&self) -> &ChannelId { &self.channel }

  /// The next message posted in this feed's channel. `None` once the bus is
  /// closed. Cancel-safe.
  pub async fn next(&mut self) -> Option<GuessAttempt> {
    loop {
      match self.rx.recv().await {
        Ok(msg) if msg.channel == self.channel => return Some(msg.into()),
        Ok(_) => {}
        Err(RecvError::Lagged(dropped)) => {
          warn!(channel = %self.channel, dropped, "guess feed lagged");
        }
        Err(RecvError::Closed) => return None,
      }
    }
  }

  /// Drop everything received so far. Messages sent before the question
  /// was asked are not guesses.
  pub fn discard_pending(&mut self) {
    loop {
      match self.rx.try_recv() {
        Ok(_) | Err(TryRecvError::Lagged(_)) => {}
        Err(TryRecvError::Empty | TryRecvError::Closed) => break,
      }
    }
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Plays rounds against a subject provider. Cheap to clone.
pub struct RoundEngine<P> {
  provider: Arc<P>,
  config:   Arc<GameConfig>,
}

impl<P> Clone for RoundEngine<P> {
  fn clone(&self) -> Self {
    Self {
      provider: Arc::clone(&self.provider),
      config:   Arc::clone(&self.config),
    }
  }
}

/// Everything derived from the subject before the race starts.
struct Composed {
  subject:  Arc<Subject>,
  answer:   String,
  question: String,
  hints:    Vec<Hint>,
}

impl<P: SubjectProvider> RoundEngine<P> {
  pub fn new(provider: Arc<P>, config: Arc<GameConfig>) -> Self {
    Self { provider, config }
  }

  pub fn config(&self) -> &GameConfig { &self.config }

  /// Play one round. Emits `FetchingSubject` first and exactly one terminal
  /// event last, unless the receiver is dropped first.
  pub async fn run<R: Rng + Send>(
    &self,
    mut feed: GuessFeed,
    events: mpsc::Sender<RoundEvent>,
    mut rng: R,
  ) -> RoundOutcome {
    let emit = |event: RoundEvent| {
      let events = &events;
      async move { events.send(event).await.map_err(|_| Cancelled) }
    };

    if emit(RoundEvent::FetchingSubject).await.is_err() {
      return RoundOutcome::Cancelled;
    }

    let composed = match self.prepare(&mut rng).await {
      Ok(composed) => composed,
      Err(e) => {
        error!(channel = %feed.channel(), error = %e, "round failed");
        let failed = emit(RoundEvent::Error { cause: e.to_string() }).await;
        return match failed {
          Ok(()) => RoundOutcome::Failed,
          Err(Cancelled) => RoundOutcome::Cancelled,
        };
      }
    };

    feed.discard_pending();
    match self.race(composed, &mut feed, &emit).await {
      Ok(outcome) => {
        sleep(self.config.grace).await;
        outcome
      }
      Err(Cancelled) => RoundOutcome::Cancelled,
    }
  }

  async fn prepare<R: Rng + Send>(&self, rng: &mut R) -> Result<Composed> {
    let subject = Arc::new(self.fetch().await?);
    let cfg = &self.config;

    let answer = subject.display_name().to_owned();
    let description = subject
      .descriptions_in(&cfg.language)
      .collect::<Vec<_>>()
      .choose(&mut *rng)
      .map(|text| text.replace('\u{000c}', "\n"))
      .ok_or_else(|| whosthat_core::Error::MissingDescription {
        language: cfg.language.clone(),
      })?;
    let question = format!(
      "Who's that Pokémon!? ```{}```",
      redact(&description, &answer, REDACTED)
    );

    let hints = HintGenerator::new(&*self.provider, &cfg.language, cfg.reveal)
      .generate(&subject, &cfg.pipeline, rng)
      .await?;

    debug!(subject = %subject.name, hints = hints.len(), "round composed");
    Ok(Composed { subject, answer, question, hints })
  }

  async fn fetch(&self) -> Result<Subject> {
    let attempts = self.config.fetch_attempts.max(1);
    let mut attempt = 1;
    loop {
      debug!(attempt, "fetching subject");
      match self.provider.random_subject().await {
        Ok(subject) => return Ok(subject),
        Err(e) if attempt < attempts => {
          warn!(attempt, error = %e, "subject fetch failed, retrying");
          sleep(self.config.fetch_retry_delay).await;
          attempt += 1;
        }
        Err(e) => {
          return Err(Error::Fetch { attempts, source: Box::new(e) });
        }
      }
    }
  }

  /// Ask the question, then reveal hints on schedule until someone answers
  /// or time runs out.
  ///
  /// When several conditions are ready at once, a correct guess beats the
  /// timeout, and the timeout beats a pending hint.
  async fn race<F, Fut>(
    &self,
    composed: Composed,
    feed: &mut GuessFeed,
    emit: &F,
  ) -> Result<RoundOutcome, Cancelled>
  where
    F: Fn(RoundEvent) -> Fut,
    Fut: Future<Output = Result<(), Cancelled>>,
  {
    let Composed { subject, answer, question, hints } = composed;
    emit(RoundEvent::Question { subject: Arc::clone(&subject), text: question })
      .await?;

    let start = Instant::now();
    let interval = self.config.hint_interval();
    let timeout = sleep_until(start + self.config.round_duration);
    tokio::pin!(timeout);

    let mut pending: VecDeque<Hint> = hints.into();
    let mut revealed = 0u32;
    let mut guesses_open = true;

    let (terminal, outcome) = loop {
      let next_hint_at = start + interval * (revealed + 1);
      tokio::select! {
        biased;

        guess = feed.next(), if guesses_open => match guess {
          Some(guess) if matcher::matches(&guess.text, &answer) => {
            let author = guess.author;
            break (
              RoundEvent::CorrectAnswer {
                subject: Arc::clone(&subject),
                author:  author.clone(),
              },
              RoundOutcome::Answered(author),
            );
          }
          Some(_) => {}
          None => guesses_open = false,
        },

        () = &mut timeout => {
          break (
            RoundEvent::Timeout { subject: Arc::clone(&subject) },
            RoundOutcome::TimedOut,
          );
        }

        () = sleep_until(next_hint_at), if !pending.is_empty() => {
          if let Some(hint) = pending.pop_front() {
            emit(RoundEvent::Hint { subject: Arc::clone(&subject), hint }).await?;
            revealed += 1;
          }
        }
      }
    };

    match &outcome {
      RoundOutcome::Answered(author) => {
        info!(channel = %feed.channel(), subject = %subject.name, %author, "answered");
      }
      _ => info!(channel = %feed.channel(), subject = %subject.name, "timed out"),
    }
    emit(terminal).await?;
    Ok(outcome)
  }
}

/// Replace every case-insensitive occurrence of `name` in `text` with
/// `marker`.
pub fn redact(text: &str, name: &str, marker: &str) -> String {
  let needle: Vec<char> = name.chars().flat_map(char::to_lowercase).collect();
  if needle.is_empty() {
    return text.to_owned();
  }

  let chars: Vec<(usize, char)> = text.char_indices().collect();
  let mut out = String::with_capacity(text.len());
  let mut i = 0;
  while i < chars.len() {
    let hit = chars.len() - i >= needle.len()
      && chars[i..i + needle.len()]
        .iter()
        .zip(&needle)
        .all(|((_, c), n)| c.to_lowercase().eq(std::iter::once(*n)));
    if hit {
      out.push_str(marker);
      i += needle.len();
    } else {
      out.push(chars[i].1);
      i += 1;
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn redact_is_case_insensitive() {
    assert_eq!(
      redact("PIKACHU stores electricity. Pikachu!", "pikachu", REDACTED),
      "[REDACTED] stores electricity. [REDACTED]!"
    );
  }

  #[test]
  fn redact_leaves_other_text_alone() {
    assert_eq!(
      redact("A strange seed was planted.", "bulbasaur", REDACTED),
      "A strange seed was planted."
    );
    assert_eq!(redact("Pokémon", "", REDACTED), "Pokémon");
  }

  #[test]
  fn redact_handles_hyphenated_names() {
    assert_eq!(
      redact("MR-MIME is a pantomime.", "mr-mime", REDACTED),
      "[REDACTED] is a pantomime."
    );
  }
}
