//! [`PokeApi`]: the cache-through catalog client.

use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use whosthat_core::{
  provider::{ResourceKind, ResponseCache, SubjectProvider},
  subject::{LocalizedNames, Subject},
};

use crate::{
  Error, Result,
  model::{self, Named, Pokemon, ResourceList, Species, VersionGroup},
};

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Upper bound on catalog entries requested when listing.
const LIST_LIMIT: u32 = 10_000;

/// Async client for the PokéAPI REST catalog.
///
/// Cheap to clone when `C` is: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct PokeApi<C> {
  client:   Client,
  base_url: String,
  cache:    C,
}

impl<C: ResponseCache> PokeApi<C> {
  pub fn new(base_url: impl Into<String>, timeout: Duration, cache: C) -> Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .map_err(Error::Client)?;
    Ok(Self { client, base_url: base_url.into(), cache })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }

  /// `GET url`, answered from the cache when possible. Cache failures are
  /// logged and otherwise ignored.
  async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
    let cached = match self.cache.get(url).await {
      Ok(hit) => hit,
      Err(e) => {
        warn!(url, error = %e, "cache read failed");
        None
      }
    };

    let body = match cached {
      Some(body) => {
        debug!(url, "cache hit");
        body
      }
      None => {
        debug!(url, "cache miss");
        let body = self.fetch(url).await?;
        if let Err(e) = self.cache.set(url, body.clone()).await {
          warn!(url, error = %e, "cache write failed");
        }
        body
      }
    };

    serde_json::from_str(&body).map_err(|source| Error::Decode {
      url: url.to_owned(),
      source,
    })
  }

  async fn fetch(&self, url: &str) -> Result<String> {
    let request_error = |source| Error::Request { url: url.to_owned(), source };

    let resp = self.client.get(url).send().await.map_err(request_error)?;
    if !resp.status().is_success() {
      return Err(Error::Status { url: url.to_owned(), status: resp.status() });
    }
    resp.text().await.map_err(request_error)
  }

  // ── Catalog ───────────────────────────────────────────────────────────────

  /// `GET /pokemon/?limit=0`: number of entries in the catalog.
  pub async fn count(&self) -> Result<u32> {
    let list: ResourceList = self.get(&self.url("/pokemon/?limit=0")).await?;
    Ok(list.count)
  }

  /// `GET /pokemon/<id>/` and its species.
  pub async fn subject_by_id(&self, id: u32) -> Result<Subject> {
    self.subject_at(&self.url(&format!("/pokemon/{id}/"))).await
  }

  async fn subject_at(&self, url: &str) -> Result<Subject> {
    let pokemon: Pokemon = self.get(url).await?;
    let species: Species = self.get(&pokemon.species.url).await?;
    debug!(id = pokemon.id, name = %pokemon.name, "subject fetched");
    Ok(model::into_subject(pokemon, species))
  }

  /// Localized names of every version in a version group, joined.
  async fn version_group(&self, name: &str) -> Result<LocalizedNames> {
    let url = self.url(&format!("/{}/{name}/", ResourceKind::VersionGroup));
    let group: VersionGroup = self.get(&url).await?;

    let mut versions = Vec::with_capacity(group.versions.len());
    for version in group.versions {
      let names = self.named(ResourceKind::Version, &version.name).await?;
      versions.push((version.name, names));
    }
    Ok(model::join_versions(&versions))
  }

  async fn named(&self, kind: ResourceKind, name: &str) -> Result<LocalizedNames> {
    let raw: Named = self.get(&self.url(&format!("/{kind}/{name}/"))).await?;
    Ok(raw.into())
  }
}

impl<C: ResponseCache> SubjectProvider for PokeApi<C> {
  type Error = Error;

  async fn random_subject(&self) -> Result<Subject> {
    let list: ResourceList = self
      .get(&self.url(&format!("/pokemon/?limit={LIST_LIMIT}")))
      .await?;
    let url = list
      .results
      .choose(&mut rand::thread_rng())
      .map(|entry| entry.url.clone())
      .ok_or(Error::EmptyCatalog)?;
    self.subject_at(&url).await
  }

  async fn lookup(&self, kind: ResourceKind, name: &str) -> Result<LocalizedNames> {
    match kind {
      ResourceKind::VersionGroup => self.version_group(name).await,
      _ => self.named(kind, name).await,
    }
  }
}
