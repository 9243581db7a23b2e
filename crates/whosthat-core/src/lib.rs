//! Core types and trait definitions for the whosthat quiz.
//!
//! This crate is deliberately free of HTTP, database and timer dependencies.
//! It holds the domain model, the answer matcher, the hint generator and the
//! collaborator traits every other crate plugs into.

pub mod error;
pub mod event;
pub mod hint;
pub mod matcher;
pub mod provider;
pub mod subject;

pub use error::{Error, Result};
