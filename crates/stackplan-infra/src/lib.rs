//! Infrastructure layer for Stackplan.
//!
//! Contains implementations of the repository traits defined in `stackplan-core`
//! (SQLite plan storage), the catalog loader, and the `config.toml` loader.

pub mod catalog;
pub mod config;
pub mod sqlite;
