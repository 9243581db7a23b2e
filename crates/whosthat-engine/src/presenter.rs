//! Outbound text for every event a session reports.

use whosthat_core::event::RoundEvent;

/// Renders events into chat messages in one display language.
#[derive(Debug, Clone)]
pub struct Presenter {
  language: String,
}

impl Presenter {
  pub fn new(language: impl Into<String>) -> Self {
    Self { language: language.into() }
  }

  pub fn render(&self, event: &RoundEvent) -> String {
    match event {
      RoundEvent::FetchingSubject => "Getting the next Pokémon...".to_owned(),
      RoundEvent::Question { text, .. } => text.clone(),
      RoundEvent::Hint { hint, .. } => format!("Here's a hint: {hint}"),
      RoundEvent::CorrectAnswer { subject, author } => format!(
        "{author} got it right!! It was {}!!",
        subject.localized_name(&self.language)
      ),
      RoundEvent::Timeout { subject } => format!(
        "No one answered it right!! It was {}!",
        subject.localized_name(&self.language)
      ),
      RoundEvent::Error { cause } => format!("Something went wrong: {cause}"),
      RoundEvent::RoundsExhausted => "That's all, folks!".to_owned(),
    }
  }

  /// Acknowledges a stop command.
  pub fn stopped(&self) -> String { "Game stopped.".to_owned() }
}
