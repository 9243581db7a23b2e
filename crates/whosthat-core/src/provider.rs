//! Collaborator traits: the subject catalog, the chat transport and the
//! response cache.
//!
//! Backends live in other crates (`whosthat-pokeapi`, `whosthat-cache`,
//! `whosthat-bot`). The engine depends on these abstractions only.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  event::{Author, ChannelId},
  subject::{LocalizedNames, Subject},
};

/// Catalog resources whose localized names can be looked up by name.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  strum::Display,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ResourceKind {
  /// A category tag (elemental type).
  Type,
  /// A numeric trait (base stat).
  Stat,
  Move,
  MoveLearnMethod,
  Version,
  VersionGroup,
}

// ─── Subject catalog ─────────────────────────────────────────────────────────

/// Source of quiz subjects.
///
/// Every call is an idempotent read. Failures surface as a single error per
/// call; retry policy belongs to the caller.
pub trait SubjectProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch one subject chosen uniformly from the catalog.
  fn random_subject(
    &self,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send;

  /// Resolve the localized names of a catalog resource.
  fn lookup(
    &self,
    kind: ResourceKind,
    name: &str,
  ) -> impl Future<Output = Result<LocalizedNames, Self::Error>> + Send;
}

// ─── Chat transport ──────────────────────────────────────────────────────────

/// Outbound side of the chat transport.
pub trait Transport: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Post `text` to a channel. Resolves once the message is delivered.
  fn send(
    &self,
    channel: &ChannelId,
    text: &str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;

  /// Send `text` privately to a single user.
  fn send_direct(
    &self,
    user: &Author,
    text: &str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

// ─── Response cache ──────────────────────────────────────────────────────────

/// Key/value store for catalog responses. Entries expire after a fixed TTL.
///
/// Callers must never rely on an entry being present.
pub trait ResponseCache: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn get(
    &self,
    key: &str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send;

  fn set(
    &self,
    key: &str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
