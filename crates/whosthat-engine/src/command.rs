//! Control intents recognised in messages addressed to the bot.

/// What a mention-addressed message asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
  /// Begin a session in the message's channel.
  Start,
  /// End the session running in the message's channel.
  Stop,
  /// Owner-only: request an invite link.
  Invite,
}

impl Intent {
  /// Parse the intent out of already-cleaned message text.
  ///
  /// Matches whole words, case-insensitively. `stop` and `end` both stop a
  /// session; when a message names several intents, stopping wins.
  pub fn parse(text: &str) -> Option<Self> {
    let words: Vec<String> = text
      .split(|c: char| !c.is_alphanumeric())
      .filter(|w| !w.is_empty())
      .map(str::to_lowercase)
      .collect();
    let has = |word: &str| words.iter().any(|w| w == word);

    if has("stop") || has("end") {
      Some(Self::Stop)
    } else if has("start") {
      Some(Self::Start)
    } else if has("invite") {
      Some(Self::Invite)
    } else {
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn recognises_commands() {
    assert_eq!(Intent::parse("start"), Some(Intent::Start));
    assert_eq!(Intent::parse("please START a game!"), Some(Intent::Start));
    assert_eq!(Intent::parse("stop"), Some(Intent::Stop));
    assert_eq!(Intent::parse("end the game"), Some(Intent::Stop));
    assert_eq!(Intent::parse("invite"), Some(Intent::Invite));
  }

  #[test]
  fn ignores_letters_inside_other_words() {
    // None of these contain the words themselves.
    assert_eq!(Intent::parse("hello there"), None);
    assert_eq!(Intent::parse("pending tests"), None);
    assert_eq!(Intent::parse("restart"), None);
    assert_eq!(Intent::parse("stopwatch"), None);
    assert_eq!(Intent::parse(""), None);
  }

  #[test]
  fn stop_takes_precedence() {
    assert_eq!(Intent::parse("start or stop?"), Some(Intent::Stop));
  }
}
