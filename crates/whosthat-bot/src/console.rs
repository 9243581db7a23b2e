//! A line-oriented chat transport over stdin/stdout.
//!
//! Input lines look like `[#channel] author: message`. A message addressed to
//! the bot carries its handle (`@whosthat start`); the handle is stripped
//! before the text reaches the engine. Output lines are `[#channel] text` for
//! channel posts and `[@user] text` for direct messages.

use std::io;

use tokio::{
  io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
  sync::{Mutex, mpsc},
};
use tracing::{debug, warn};
use whosthat_core::{
  event::{Author, ChannelId, InboundMessage},
  provider::Transport,
};

pub struct ConsoleTransport<W> {
  out: Mutex<W>,
}

impl<W: AsyncWrite + Unpin + Send> ConsoleTransport<W> {
  pub fn new(out: W) -> Self { Self { out: Mutex::new(out) } }

  pub fn into_inner(self) -> W { self.out.into_inner() }

  async fn write_line(&self, line: String) -> io::Result<()> {
    let mut out = self.out.lock().await;
    out.write_all(line.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await
  }
}

impl<W: AsyncWrite + Unpin + Send> Transport for ConsoleTransport<W> {
  type Error = io::Error;

  async fn send(&self, channel: &ChannelId, text: &str) -> io::Result<()> {
    self.write_line(format!("[{channel}] {text}")).await
  }

  async fn send_direct(&self, user: &Author, text: &str) -> io::Result<()> {
    self.write_line(format!("[@{user}] {text}")).await
  }
}

/// Parse one input line. `None` if it is not `[channel] author: text`.
pub fn parse_line(line: &str, handle: &str) -> Option<InboundMessage> {
  let rest = line.trim().strip_prefix('[')?;
  let (channel, rest) = rest.split_once(']')?;
  let (author, text) = rest.split_once(':')?;
  let (channel, author) = (channel.trim(), author.trim());
  if channel.is_empty() || author.is_empty() {
    return None;
  }

  let (mentioned, text) = strip_mention(text, handle);
  Some(InboundMessage {
    channel: ChannelId(channel.to_owned()),
    author: Author(author.to_owned()),
    text,
    mentioned,
  })
}

/// Whether `text` mentions `handle`, and the text with every mention removed.
fn strip_mention(text: &str, handle: &str) -> (bool, String) {
  let is_mention = |word: &str| {
    word
      .trim_end_matches(|c: char| c.is_ascii_punctuation())
      .eq_ignore_ascii_case(handle)
  };

  let mentioned = text.split_whitespace().any(is_mention);
  let cleaned = text
    .split_whitespace()
    .filter(|w| !is_mention(w))
    .collect::<Vec<_>>()
    .join(" ");
  (mentioned, cleaned)
}

/// Forward parsed lines from `reader` until it reaches EOF or the receiver
/// goes away. Unparseable lines are logged and skipped.
pub async fn read_inbound<R>(
  reader: R,
  handle: String,
  tx: mpsc::Sender<InboundMessage>,
) -> io::Result<()>
where
  R: AsyncBufRead + Unpin,
{
  let mut lines = reader.lines();
  while let Some(line) = lines.next_line().await? {
    if line.trim().is_empty() {
      continue;
    }
    match parse_line(&line, &handle) {
      Some(msg) => {
        if tx.send(msg).await.is_err() {
          break;
        }
      }
      None => warn!(line, "expected `[#channel] author: message`"),
    }
  }
  debug!("console input closed");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_plain_messages() {
    let msg = parse_line("[#general] ash: is it pikachu?", "@whosthat").unwrap();
    assert_eq!(msg.channel, ChannelId("#general".into()));
    assert_eq!(msg.author, Author("ash".into()));
    assert_eq!(msg.text, "is it pikachu?");
    assert!(!msg.mentioned);
  }

  #[test]
  fn strips_mentions() {
    let msg = parse_line("[#general] oak: @WhosThat, start!", "@whosthat").unwrap();
    assert!(msg.mentioned);
    assert_eq!(msg.text, "start!");

    // A longer handle is someone else.
    let msg = parse_line("[#general] oak: @whosthatbot start", "@whosthat").unwrap();
    assert!(!msg.mentioned);
  }

  #[test]
  fn rejects_malformed_lines() {
    assert_eq!(parse_line("hello", "@whosthat"), None);
    assert_eq!(parse_line("[#general] no colon here", "@whosthat"), None);
    assert_eq!(parse_line("[] ash: hi", "@whosthat"), None);
    assert_eq!(parse_line("[#general] : hi", "@whosthat"), None);
  }

  #[tokio::test]
  async fn forwards_lines_until_eof() {
    let input: &[u8] = b"[#a] ash: one\n\nnot a message\n[#b] @whosthat: two\n";
    let (tx, mut rx) = mpsc::channel(8);

    read_inbound(input, "@whosthat".into(), tx).await.unwrap();

    assert_eq!(rx.recv().await.unwrap().text, "one");
    let second = rx.recv().await.unwrap();
    assert_eq!(second.author, Author("@whosthat".into()));
    assert_eq!(second.text, "two");
    assert!(rx.recv().await.is_none());
  }

  #[tokio::test]
  async fn writes_channel_and_direct_lines() {
    let console = ConsoleTransport::new(Vec::new());

    console.send(&ChannelId("#general".into()), "hello").await.unwrap();
    console.send_direct(&Author("oak".into()), "psst").await.unwrap();

    let out = String::from_utf8(console.into_inner()).unwrap();
    assert_eq!(out, "[#general] hello\n[@oak] psst\n");
  }
}
