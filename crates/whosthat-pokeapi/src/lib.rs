//! A [`SubjectProvider`](whosthat_core::provider::SubjectProvider) over the
//! public PokéAPI catalog.
//!
//! Every GET goes through a [`ResponseCache`](whosthat_core::provider::ResponseCache)
//! keyed by request URL; catalog data changes rarely, so the cache absorbs
//! nearly all traffic after warm-up.

mod client;
mod model;

pub mod error;

pub use client::{DEFAULT_BASE_URL, PokeApi};
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
