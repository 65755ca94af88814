//! Shared domain types for Stackplan.
//!
//! This crate contains the types used across the workspace: the catalog
//! schema, user selections, analysis results, the persisted plan shapes,
//! identifiers, configuration, and error enums.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ids;
pub mod plan;
pub mod selection;
