//! Storage infrastructure: configuration file persistence.
//!
//! - `config` reads and writes the TOML configuration file, with defaults for
//!   a first run.
//! - `preferences` persists the `last_layout` value from a background task.

pub mod config;
pub mod preferences;
