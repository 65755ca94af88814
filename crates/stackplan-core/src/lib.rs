//! Business logic and repository trait definitions for Stackplan.
//!
//! This crate holds the analysis engine, the selection session, plan commit,
//! and the debounced plan store, plus the ports (repository traits) that the
//! infrastructure layer implements. It depends only on `stackplan-types`,
//! never on `stackplan-infra` or any database/IO crate.

pub mod analysis;
pub mod plan;
pub mod repository;
pub mod session;

#[cfg(test)]
mod testing;
