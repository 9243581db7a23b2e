//! Client tests against a local fake catalog served with axum.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
  time::Duration,
};

use axum::{
  Json, Router,
  extract::State,
  http::{StatusCode, Uri},
  response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use whosthat_cache::MemoryCache;
use whosthat_core::provider::{ResourceKind, SubjectProvider};

use crate::{Error, PokeApi};

// ─── Fake catalog ────────────────────────────────────────────────────────────

#[derive(Default)]
struct Catalog {
  routes: HashMap<String, Value>,
  hits:   Mutex<Vec<String>>,
}

impl Catalog {
  fn hits(&self) -> Vec<String> { self.hits.lock().unwrap().clone() }
}

async fn respond(State(catalog): State<Arc<Catalog>>, uri: Uri) -> Response {
  catalog.hits.lock().unwrap().push(uri.path().to_owned());
  match catalog.routes.get(uri.path()) {
    Some(body) => Json(body.clone()).into_response(),
    None => StatusCode::NOT_FOUND.into_response(),
  }
}

/// Serve the routes built by `routes` (which receives the server's base URL)
/// and return a client pointed at it.
async fn serve(
  routes: impl FnOnce(&str) -> HashMap<String, Value>,
) -> (PokeApi<MemoryCache>, Arc<Catalog>) {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let base = format!("http://{}", listener.local_addr().unwrap());
  let catalog = Arc::new(Catalog { routes: routes(&base), ..Catalog::default() });

  let app = Router::new().fallback(respond).with_state(Arc::clone(&catalog));
  tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

  let cache = MemoryCache::new(Duration::from_secs(60 * 60));
  let api = PokeApi::new(base, Duration::from_secs(5), cache).unwrap();
  (api, catalog)
}

fn names(pairs: &[(&str, &str)]) -> Value {
  let names: Vec<Value> = pairs
    .iter()
    .map(|(lang, name)| json!({ "name": name, "language": { "name": lang, "url": "" } }))
    .collect();
  json!({ "id": 1, "names": names })
}

fn pikachu_routes(base: &str) -> HashMap<String, Value> {
  HashMap::from([
    ("/pokemon/".to_owned(), json!({
      "count": 1,
      "results": [{ "name": "pikachu", "url": format!("{base}/pokemon/25/") }],
    })),
    ("/pokemon/25/".to_owned(), json!({
      "id": 25,
      "name": "pikachu",
      "species": { "name": "pikachu", "url": format!("{base}/pokemon-species/25/") },
      "types": [{ "slot": 1, "type": { "name": "electric", "url": "" } }],
      "stats": [{ "base_stat": 90, "stat": { "name": "speed", "url": "" } }],
      "moves": [],
    })),
    ("/pokemon-species/25/".to_owned(), json!({
      "names": [{ "name": "Pikachu", "language": { "name": "en", "url": "" } }],
      "flavor_text_entries": [{
        "flavor_text": "It stores electricity in its cheeks.",
        "language": { "name": "en", "url": "" },
      }],
      "genera": [{ "genus": "Mouse Pokémon", "language": { "name": "en", "url": "" } }],
    })),
    ("/type/electric/".to_owned(), names(&[("en", "Electric"), ("de", "Elektro")])),
    ("/version-group/red-blue/".to_owned(), json!({
      "name": "red-blue",
      "versions": [
        { "name": "red", "url": format!("{base}/version/red/") },
        { "name": "blue", "url": format!("{base}/version/blue/") },
      ],
    })),
    ("/version/red/".to_owned(), names(&[("en", "Red"), ("ja", "赤")])),
    ("/version/blue/".to_owned(), names(&[("en", "Blue")])),
    ("/type/broken/".to_owned(), json!("not a resource")),
  ])
}

// ─── Subjects ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn random_subject_fetches_entry_then_species() {
  let (api, catalog) = serve(pikachu_routes).await;

  let subject = api.random_subject().await.unwrap();

  assert_eq!(subject.id, 25);
  assert_eq!(subject.localized_name("en"), "Pikachu");
  assert_eq!(subject.genus.get("en"), Some("Mouse Pokémon"));
  assert_eq!(catalog.hits(), ["/pokemon/", "/pokemon/25/", "/pokemon-species/25/"]);
}

#[tokio::test]
async fn repeated_requests_are_served_from_cache() {
  let (api, catalog) = serve(pikachu_routes).await;

  api.random_subject().await.unwrap();
  api.random_subject().await.unwrap();
  api.subject_by_id(25).await.unwrap();

  assert_eq!(catalog.hits().len(), 3);
}

#[tokio::test]
async fn count_reads_the_listing() {
  let (api, _) = serve(pikachu_routes).await;
  assert_eq!(api.count().await.unwrap(), 1);
}

#[tokio::test]
async fn empty_catalog_is_an_error() {
  let (api, _) = serve(|_| {
    HashMap::from([("/pokemon/".to_owned(), json!({ "count": 0, "results": [] }))])
  })
  .await;

  let err = api.random_subject().await.unwrap_err();
  assert!(matches!(err, Error::EmptyCatalog));
}

// ─── Lookups ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn lookup_resolves_localized_names() {
  let (api, catalog) = serve(pikachu_routes).await;

  let names = api.lookup(ResourceKind::Type, "electric").await.unwrap();

  assert_eq!(names.get("de"), Some("Elektro"));
  assert_eq!(catalog.hits(), ["/type/electric/"]);
}

#[tokio::test]
async fn version_group_joins_its_versions() {
  let (api, _) = serve(pikachu_routes).await;

  let names = api.lookup(ResourceKind::VersionGroup, "red-blue").await.unwrap();

  assert_eq!(names.get("en"), Some("Red / Blue"));
  assert_eq!(names.get("ja"), Some("赤 / blue"));
}

#[tokio::test]
async fn http_errors_carry_the_status() {
  let (api, _) = serve(pikachu_routes).await;

  let err = api.lookup(ResourceKind::Move, "splash").await.unwrap_err();

  assert!(
    matches!(err, Error::Status { status, .. } if status == StatusCode::NOT_FOUND)
  );
  assert!(err.to_string().ends_with("/move/splash/ → 404 Not Found"));
}

#[tokio::test]
async fn malformed_bodies_fail_to_decode() {
  let (api, _) = serve(pikachu_routes).await;

  let err = api.lookup(ResourceKind::Type, "broken").await.unwrap_err();

  assert!(matches!(err, Error::Decode { .. }));
}
