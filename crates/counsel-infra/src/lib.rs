//! Infrastructure layer for Counsel.
//!
//! SQLite implementations of the repository traits defined in
//! `counsel-core`, plus data directory resolution and config loading.

pub mod config;
pub mod sqlite;
