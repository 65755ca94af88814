//! Stack compatibility analysis.
//!
//! [`engine::analyze`] is the entry point; [`rules`] holds the per-domain
//! rule table it dispatches to.

pub mod engine;
pub mod rules;

pub use engine::analyze;
