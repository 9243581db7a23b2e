//! Wiring for the `whosthat` quiz bot: configuration, a line-oriented console
//! chat transport and the owner-only invite responder.

pub mod console;
pub mod invite;
pub mod settings;

pub use console::ConsoleTransport;
pub use invite::InviteResponder;
pub use settings::BotConfig;
