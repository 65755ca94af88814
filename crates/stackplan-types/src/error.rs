use thiserror::Error;

use crate::catalog::Facet;

/// Errors from loading or validating the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog parse error: {0}")]
    Parse(String),

    #[error("catalog read error: {0}")]
    Io(String),

    #[error("duplicate domain '{0}'")]
    DuplicateDomain(String),

    #[error("duplicate subdomain '{subdomain}' in domain '{domain}'")]
    DuplicateSubdomain { domain: String, subdomain: String },

    #[error("duplicate component '{component}' in subdomain '{subdomain}'")]
    DuplicateComponent { subdomain: String, component: String },

    #[error("duplicate tool '{tool}' in component '{component}'")]
    DuplicateTool { component: String, tool: String },

    #[error("tool '{tool}' has {facet} score {value}, expected 0-10")]
    ScoreOutOfRange { tool: String, facet: Facet, value: u8 },
}

/// Errors from toggling a selection against the catalog.
///
/// Analysis never raises these: stale ids are dropped there. They only
/// guard the interactive toggle path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("unknown domain '{0}'")]
    UnknownDomain(String),

    #[error("unknown subdomain '{0}'")]
    UnknownSubdomain(String),

    #[error("unknown component '{component}' in subdomain '{subdomain}'")]
    UnknownComponent { subdomain: String, component: String },

    #[error("unknown tool '{tool}' in component '{component}'")]
    UnknownTool { component: String, tool: String },
}

/// Errors from repository operations (used by trait definitions in stackplan-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors surfaced by the plan store.
#[derive(Debug, Error)]
pub enum PlanStoreError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("persistence error: {0}")]
    Persistence(#[from] RepositoryError),
}
