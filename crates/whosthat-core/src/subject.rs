//! Subject — the creature a round asks players to identify.
//!
//! A subject is fetched once per round and never mutated afterwards. The
//! round engine wraps it in an `Arc` and hands read-only references to every
//! derived computation (name, description, hints) and to every emitted event.

use serde::{Deserialize, Serialize};

// ─── Localisation ────────────────────────────────────────────────────────────

/// A piece of text tagged with the language it is written in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
  pub language: String,
  pub text:     String,
}

impl LocalizedText {
  pub fn new(language: impl Into<String>, text: impl Into<String>) -> Self {
    Self { language: language.into(), text: text.into() }
  }
}

/// A set of translations of the same name or phrase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedNames(pub Vec<LocalizedText>);

impl LocalizedNames {
  /// The entry for `language`, if there is one.
  pub fn get(&self, language: &str) -> Option<&str> {
    self
      .0
      .iter()
      .find(|t| t.language == language)
      .map(|t| t.text.as_str())
  }

  /// The entry for `language`, falling back to `fallback` when missing.
  pub fn get_or<'a>(&'a self, language: &str, fallback: &'a str) -> &'a str {
    self.get(language).unwrap_or(fallback)
  }
}

impl FromIterator<LocalizedText> for LocalizedNames {
  fn from_iter<I: IntoIterator<Item = LocalizedText>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

// ─── Attributes ──────────────────────────────────────────────────────────────

/// A category tag (elemental type) with its display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTag {
  pub slot: u8,
  pub name: String,
}

/// A named numeric trait (base stat).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericTrait {
  pub name:  String,
  pub value: u32,
}

/// The context in which a subject learns an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnContext {
  pub level:         u32,
  pub method:        String,
  pub version_group: String,
}

/// An action (move) the subject can learn, with every version context it is
/// learnable in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnedAction {
  pub name:     String,
  pub contexts: Vec<LearnContext>,
}

// ─── Subject ─────────────────────────────────────────────────────────────────

/// Names that legitimately contain a hyphen and must not lose their suffix.
pub const HYPHENATED_NAMES: &[&str] = &[
  "ho-oh",
  "mr-mime",
  "mime-jr",
  "mr-rime",
  "porygon-z",
  "type-null",
  "jangmo-o",
  "hakamo-o",
  "kommo-o",
  "tapu-koko",
  "tapu-lele",
  "tapu-bulu",
  "tapu-fini",
];

/// One quiz target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub id:           u32,
  /// Canonical catalog name, e.g. `deoxys-normal`.
  pub name:         String,
  pub names:        LocalizedNames,
  pub descriptions: Vec<LocalizedText>,
  pub categories:   Vec<CategoryTag>,
  pub traits:       Vec<NumericTrait>,
  /// Short categorical description ("Seed Pokémon").
  pub genus:        LocalizedNames,
  pub actions:      Vec<LearnedAction>,
}

impl Subject {
  /// The name players have to guess: the canonical name with any
  /// regional/form suffix (`-<suffix>`) stripped, unless the name is one of
  /// [`HYPHENATED_NAMES`].
  pub fn display_name(&self) -> &str {
    if HYPHENATED_NAMES
      .iter()
      .any(|n| n.eq_ignore_ascii_case(&self.name))
    {
      return &self.name;
    }
    match self.name.split_once('-') {
      Some((base, _)) => base,
      None => &self.name,
    }
  }

  /// The localized display name used when revealing the answer.
  pub fn localized_name(&self, language: &str) -> &str {
    self.names.get_or(language, self.display_name())
  }

  /// Descriptive texts written in `language`.
  pub fn descriptions_in<'a>(
    &'a self,
    language: &'a str,
  ) -> impl Iterator<Item = &'a str> + 'a {
    self
      .descriptions
      .iter()
      .filter(move |d| d.language == language)
      .map(|d| d.text.as_str())
  }

  /// Category tags in display order.
  pub fn ordered_categories(&self) -> Vec<&CategoryTag> {
    let mut tags: Vec<_> = self.categories.iter().collect();
    tags.sort_by_key(|t| t.slot);
    tags
  }
}
