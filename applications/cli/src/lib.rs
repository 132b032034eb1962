//! Tunebox CLI
//!
//! Terminal front end wiring the server client, the local store and the
//! player state machine together.

pub mod commands;
pub mod config;
pub mod error;
pub mod player;

pub use config::AppConfig;
pub use error::{CliError, Result};
