//! Raw catalog responses and their mapping onto domain types.
//!
//! Only the fields the game reads are modelled; serde ignores the rest.

use serde::Deserialize;
use whosthat_core::subject::{
  CategoryTag, LearnContext, LearnedAction, LocalizedNames, LocalizedText,
  NumericTrait, Subject,
};

#[derive(Debug, Deserialize)]
pub struct NamedResource {
  pub name: String,
  pub url:  String,
}

#[derive(Debug, Deserialize)]
pub struct ResourceList {
  pub count:   u32,
  #[serde(default)]
  pub results: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
pub struct Language {
  pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Name {
  pub name:     String,
  pub language: Language,
}

/// Any resource that only matters for its `names` (types, stats, moves,
/// learn methods, versions).
#[derive(Debug, Deserialize)]
pub struct Named {
  #[serde(default)]
  pub names: Vec<Name>,
}

impl From<Named> for LocalizedNames {
  fn from(raw: Named) -> Self {
    raw
      .names
      .into_iter()
      .map(|n| LocalizedText::new(n.language.name, n.name))
      .collect()
  }
}

#[derive(Debug, Deserialize)]
pub struct VersionGroup {
  pub versions: Vec<NamedResource>,
}

// ─── Pokémon ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Pokemon {
  pub id:      u32,
  pub name:    String,
  pub species: NamedResource,
  #[serde(default)]
  pub types:   Vec<PokemonType>,
  #[serde(default)]
  pub stats:   Vec<PokemonStat>,
  #[serde(default)]
  pub moves:   Vec<PokemonMove>,
}

#[derive(Debug, Deserialize)]
pub struct PokemonType {
  pub slot: u8,
  #[serde(rename = "type")]
  pub kind: NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct PokemonStat {
  pub base_stat: u32,
  pub stat:      NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct PokemonMove {
  #[serde(rename = "move")]
  pub action:                NamedResource,
  #[serde(default)]
  pub version_group_details: Vec<VersionGroupDetail>,
}

#[derive(Debug, Deserialize)]
pub struct VersionGroupDetail {
  pub level_learned_at:  u32,
  pub move_learn_method: NamedResource,
  pub version_group:     NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct Species {
  #[serde(default)]
  pub names:               Vec<Name>,
  #[serde(default)]
  pub flavor_text_entries: Vec<FlavorText>,
  #[serde(default)]
  pub genera:              Vec<Genus>,
}

#[derive(Debug, Deserialize)]
pub struct FlavorText {
  pub flavor_text: String,
  pub language:    Language,
}

#[derive(Debug, Deserialize)]
pub struct Genus {
  pub genus:    String,
  pub language: Language,
}

/// Merge a catalog entry and its species record into a [`Subject`].
pub fn into_subject(pokemon: Pokemon, species: Species) -> Subject {
  Subject {
    id:           pokemon.id,
    name:         pokemon.name,
    names:        Named { names: species.names }.into(),
    descriptions: species
      .flavor_text_entries
      .into_iter()
      .map(|f| LocalizedText::new(f.language.name, f.flavor_text))
      .collect(),
    categories:   pokemon
      .types
      .into_iter()
      .map(|t| CategoryTag { slot: t.slot, name: t.kind.name })
      .collect(),
    traits:       pokemon
      .stats
      .into_iter()
      .map(|s| NumericTrait { name: s.stat.name, value: s.base_stat })
      .collect(),
    genus:        species
      .genera
      .into_iter()
      .map(|g| LocalizedText::new(g.language.name, g.genus))
      .collect(),
    actions:      pokemon
      .moves
      .into_iter()
      .map(|m| LearnedAction {
        name:     m.action.name,
        contexts: m
          .version_group_details
          .into_iter()
          .map(|d| LearnContext {
            level:         d.level_learned_at,
            method:        d.move_learn_method.name,
            version_group: d.version_group.name,
          })
          .collect(),
      })
      .collect(),
  }
}

/// Join the localized names of several versions, per language, with ` / `.
/// A version missing a translation contributes its raw name.
pub fn join_versions(versions: &[(String, LocalizedNames)]) -> LocalizedNames {
  let mut languages: Vec<&str> = Vec::new();
  for (_, names) in versions {
    for text in &names.0 {
      if !languages.contains(&text.language.as_str()) {
        languages.push(&text.language);
      }
    }
  }

  languages
    .into_iter()
    .map(|language| {
      let joined = versions
        .iter()
        .map(|(raw, names)| names.get_or(language, raw))
        .collect::<Vec<_>>()
        .join(" / ");
      LocalizedText::new(language, joined)
    })
    .collect()
}
