//! Game orchestration for `whosthat`.
//!
//! A [`Controller`] keeps at most one [`Session`] per channel. A session
//! plays rounds back to back through the [`RoundEngine`], renders each
//! [`RoundEvent`](whosthat_core::event::RoundEvent) with the [`Presenter`]
//! and posts it through the chat [`Transport`](whosthat_core::provider::Transport).

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod presenter;
pub mod round;
pub mod session;

pub use command::Intent;
pub use config::GameConfig;
pub use controller::Controller;
pub use error::{Error, Result};
pub use presenter::Presenter;
pub use round::{GuessFeed, RoundEngine, RoundOutcome};
pub use session::{Session, SessionEnd};
