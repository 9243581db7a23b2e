//! Hint generation.
//!
//! A [`HintPipeline`] is an ordered list of hint tags; its order is the reveal
//! order. Generation runs in three steps:
//!
//! 1. every tag is parsed and *planned* against the subject (random choices
//!    such as which stat or move to reveal are made here);
//! 2. the distinct catalog lookups the plans need are fetched concurrently,
//!    each exactly once;
//! 3. every plan is rendered into a [`Hint`].
//!
//! Nothing is revealed until all hints are ready; the round engine decides
//! when each one is shown.

use std::{
  collections::{BTreeSet, HashMap},
  fmt,
  str::FromStr,
};

use futures::future::try_join_all;
use rand::{Rng, seq::SliceRandom};

use crate::{
  Error, Result,
  provider::{ResourceKind, SubjectProvider},
  subject::{LearnContext, LocalizedNames, NumericTrait, Subject},
};

/// Character shown in place of each hidden letter.
pub const MASK: char = '_';

// ─── Kinds and pipeline ──────────────────────────────────────────────────────

/// The kinds of hint a pipeline can reveal.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum HintKind {
  /// Category tags (types) in display order.
  Category,
  /// One random numeric trait (base stat).
  NumericTrait,
  /// The short categorical description (genus).
  Description,
  /// One random learnable action with its version context.
  LearnedAction,
  /// The display name with a trailing part masked out.
  PartialName,
}

/// Ordered hint tags, as configured. Tags are parsed when a round composes
/// its hints, so an unknown tag fails that round rather than the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HintPipeline(Vec<String>);

impl HintPipeline {
  pub fn new<I, S>(tags: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self(tags.into_iter().map(Into::into).collect())
  }

  /// `count` reveals of the same kind.
  pub fn repeated(kind: HintKind, count: usize) -> Self {
    Self(vec![kind.to_string(); count])
  }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Parse every tag, failing on the first unknown one.
  pub fn kinds(&self) -> Result<Vec<HintKind>> {
    self
      .0
      .iter()
      .map(|tag| {
        HintKind::from_str(tag).map_err(|_| Error::UnknownHintKind(tag.clone()))
      })
      .collect()
  }
}

// ─── Rendered hints ──────────────────────────────────────────────────────────

/// A rendered hint, carrying only what is needed to display it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hint {
  Categories(Vec<String>),
  NumericTrait {
    name:  String,
    value: u32,
  },
  Description(String),
  LearnedAction {
    action:   String,
    method:   String,
    level:    u32,
    versions: String,
  },
  PartialName(String),
}

impl Hint {
  pub fn kind(&self) -> HintKind {
    match self {
      Self::Categories(_) => HintKind::Category,
      Self::NumericTrait { .. } => HintKind::NumericTrait,
      Self::Description(_) => HintKind::Description,
      Self::LearnedAction { .. } => HintKind::LearnedAction,
      Self::PartialName(_) => HintKind::PartialName,
    }
  }
}

impl fmt::Display for Hint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Categories(names) => write!(f, "its type is {}", names.join(" / ")),
      Self::NumericTrait { name, value } => write!(f, "its base {name} is {value}"),
      Self::Description(genus) => write!(f, "it is the {genus}"),
      Self::LearnedAction { action, method, level, versions } => {
        write!(f, "it learns {action} ({method}")?;
        if *level > 0 {
          write!(f, ", level {level}")?;
        }
        write!(f, ") in {versions}")
      }
      Self::PartialName(masked) => write!(f, "`{masked}`"),
    }
  }
}

/// Show a leading `fraction` of `name` and mask the rest, one [`MASK`] per
/// hidden character. The result always has the same length as `name`.
pub fn partial_name(name: &str, fraction: f64) -> String {
  let len = name.chars().count();
  // Rounds down: never reveal more than the fraction asks for.
  let shown = ((len as f64) * fraction.clamp(0.0, 1.0)).floor() as usize;
  name
    .chars()
    .take(shown)
    .chain(std::iter::repeat_n(MASK, len - shown))
    .collect()
}

// ─── Generation ──────────────────────────────────────────────────────────────

/// Bounds of the fraction of the name a partial-name hint reveals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealRange {
  pub min: f64,
  pub max: f64,
}

impl Default for RevealRange {
  fn default() -> Self { Self { min: 0.2, max: 0.45 } }
}

impl RevealRange {
  fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> f64 {
    if self.min >= self.max {
      self.min
    } else {
      rng.gen_range(self.min..=self.max)
    }
  }
}

type LookupKey = (ResourceKind, String);

/// A hint with its random choices fixed but its lookups still pending.
#[derive(Debug, Clone)]
enum Plan {
  Category(Vec<String>),
  NumericTrait(NumericTrait),
  Description,
  LearnedAction { action: String, context: LearnContext },
  PartialName(f64),
}

impl Plan {
  fn new<R: Rng + ?Sized>(
    kind: HintKind,
    subject: &Subject,
    reveal: RevealRange,
    rng: &mut R,
  ) -> Result<Self> {
    Ok(match kind {
      HintKind::Category => {
        let tags = subject.ordered_categories();
        if tags.is_empty() {
          return Err(Error::MissingAttribute("categories"));
        }
        Self::Category(tags.into_iter().map(|t| t.name.clone()).collect())
      }
      HintKind::NumericTrait => Self::NumericTrait(
        subject
          .traits
          .choose(rng)
          .cloned()
          .ok_or(Error::MissingAttribute("traits"))?,
      ),
      HintKind::Description => Self::Description,
      HintKind::LearnedAction => {
        let action = subject
          .actions
          .choose(rng)
          .ok_or(Error::MissingAttribute("actions"))?;
        let context = action
          .contexts
          .choose(rng)
          .cloned()
          .ok_or(Error::MissingAttribute("action contexts"))?;
        Self::LearnedAction { action: action.name.clone(), context }
      }
      HintKind::PartialName => Self::PartialName(reveal.sample(rng)),
    })
  }

  /// Reorder the partial-name fractions so each reveal shows at least as
  /// much of the name as the one before it.
  fn ascending_reveals(plans: &mut [Plan]) {
    let mut fractions: Vec<f64> = plans
      .iter()
      .filter_map(|plan| match plan {
        Self::PartialName(fraction) => Some(*fraction),
        _ => None,
      })
      .collect();
    fractions.sort_by(f64::total_cmp);

    let mut sorted = fractions.into_iter();
    for plan in plans {
      if let Self::PartialName(fraction) = plan
        && let Some(next) = sorted.next()
      {
        *fraction = next;
      }
    }
  }

  fn lookups(&self) -> Vec<LookupKey> {
    match self {
      Self::Category(names) => names
        .iter()
        .map(|n| (ResourceKind::Type, n.clone()))
        .collect(),
      Self::NumericTrait(t) => vec![(ResourceKind::Stat, t.name.clone())],
      Self::LearnedAction { action, context } => vec![
        (ResourceKind::Move, action.clone()),
        (ResourceKind::MoveLearnMethod, context.method.clone()),
        (ResourceKind::VersionGroup, context.version_group.clone()),
      ],
      Self::Description | Self::PartialName(_) => vec![],
    }
  }

  fn render(
    self,
    subject: &Subject,
    language: &str,
    resolved: &HashMap<LookupKey, LocalizedNames>,
  ) -> Result<Hint> {
    let name = |kind: ResourceKind, raw: &str| -> String {
      resolved
        .get(&(kind, raw.to_owned()))
        .map_or(raw, |names| names.get_or(language, raw))
        .to_owned()
    };

    Ok(match self {
      Self::Category(names) => Hint::Categories(
        names.iter().map(|n| name(ResourceKind::Type, n)).collect(),
      ),
      Self::NumericTrait(t) => Hint::NumericTrait {
        name:  name(ResourceKind::Stat, &t.name),
        value: t.value,
      },
      Self::Description => Hint::Description(
        subject
          .genus
          .get(language)
          .ok_or(Error::MissingAttribute("genus"))?
          .to_owned(),
      ),
      Self::LearnedAction { action, context } => Hint::LearnedAction {
        action:   name(ResourceKind::Move, &action),
        method:   name(ResourceKind::MoveLearnMethod, &context.method),
        level:    context.level,
        versions: name(ResourceKind::VersionGroup, &context.version_group),
      },
      Self::PartialName(fraction) => {
        Hint::PartialName(partial_name(subject.display_name(), fraction))
      }
    })
  }
}

/// Builds the hints for one subject.
pub struct HintGenerator<'a, P> {
  provider: &'a P,
  language: &'a str,
  reveal:   RevealRange,
}

impl<'a, P: SubjectProvider> HintGenerator<'a, P> {
  pub fn new(provider: &'a P, language: &'a str, reveal: RevealRange) -> Self {
    Self { provider, language, reveal }
  }

  /// One hint per pipeline entry, in pipeline order.
  ///
  /// Lookup failures are not retried. Repeated partial-name hints reveal
  /// more of the name each time, never less.
  pub async fn generate<R: Rng + Send>(
    &self,
    subject: &Subject,
    pipeline: &HintPipeline,
    rng: &mut R,
  ) -> Result<Vec<Hint>> {
    let mut plans = pipeline
      .kinds()?
      .into_iter()
      .map(|kind| Plan::new(kind, subject, self.reveal, rng))
      .collect::<Result<Vec<_>>>()?;
    Plan::ascending_reveals(&mut plans);

    let keys: BTreeSet<LookupKey> = plans.iter().flat_map(Plan::lookups).collect();
    let resolved: HashMap<LookupKey, LocalizedNames> =
      try_join_all(keys.into_iter().map(|(kind, name)| async move {
        let names = self
          .provider
          .lookup(kind, &name)
          .await
          .map_err(|e| Error::Lookup(Box::new(e)))?;
        Ok::<_, Error>(((kind, name), names))
      }))
      .await?
      .into_iter()
      .collect();

    plans
      .into_iter()
      .map(|plan| plan.render(subject, self.language, &resolved))
      .collect()
  }
}
