//! Catalog schema types.
//!
//! The catalog is the static, read-only tree of domains → subdomains →
//! components → tools. It is loaded once at process start (see
//! `stackplan-infra::catalog`) and never mutated afterwards.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Highest value any facet score may take.
pub const MAX_FACET_SCORE: u8 = 10;

/// One of the four fixed scoring dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    Performance,
    Scalability,
    Learning,
    Demand,
}

impl Facet {
    /// All facets in display order.
    pub const ALL: [Facet; 4] = [
        Facet::Performance,
        Facet::Scalability,
        Facet::Learning,
        Facet::Demand,
    ];
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Facet::Performance => write!(f, "performance"),
            Facet::Scalability => write!(f, "scalability"),
            Facet::Learning => write!(f, "learning"),
            Facet::Demand => write!(f, "demand"),
        }
    }
}

/// Fixed score vector carried by every tool, each facet 0–10.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreVector {
    #[serde(default)]
    pub performance: u8,
    #[serde(default)]
    pub scalability: u8,
    #[serde(default)]
    pub learning: u8,
    #[serde(default)]
    pub demand: u8,
}

impl ScoreVector {
    pub fn get(&self, facet: Facet) -> u8 {
        match facet {
            Facet::Performance => self.performance,
            Facet::Scalability => self.scalability,
            Facet::Learning => self.learning,
            Facet::Demand => self.demand,
        }
    }
}

/// A selectable tool inside a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Unique within the owning component's tool list only.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub scores: ScoreVector,
}

/// Whether a component accepts one or many tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Multiplicity {
    #[default]
    Single,
    Multi,
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Multiplicity::Single => write!(f, "single"),
            Multiplicity::Multi => write!(f, "multi"),
        }
    }
}

impl FromStr for Multiplicity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(Multiplicity::Single),
            "multi" | "multiple" => Ok(Multiplicity::Multi),
            other => Err(format!("invalid multiplicity: '{other}'")),
        }
    }
}

/// A slot in a subdomain (e.g. "Framework", "DB Engine") offering tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub title: String,
    /// Rule-facing category. Falls back to `id` when absent.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub multiplicity: Multiplicity,
    #[serde(default)]
    pub tools: Vec<Tool>,
}

impl Component {
    /// Effective category used by viability rules.
    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or(&self.id)
    }

    pub fn tool(&self, id: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.id == id)
    }

    pub fn is_multi(&self) -> bool {
        self.multiplicity == Multiplicity::Multi
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subdomain {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub components: Vec<Component>,
}

impl Subdomain {
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    /// URL-style slug ("web", "cloud", ...).
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subdomains: Vec<Subdomain>,
}

impl Domain {
    pub fn subdomain(&self, id: &str) -> Option<&Subdomain> {
        self.subdomains.iter().find(|s| s.id == id)
    }

    /// Resolve `(subdomain, component)` in one step.
    pub fn component(&self, subdomain: &str, component: &str) -> Option<&Component> {
        self.subdomain(subdomain)?.component(component)
    }

    /// Number of tools across every component of this domain.
    pub fn tool_count(&self) -> usize {
        self.subdomains
            .iter()
            .flat_map(|s| s.components.iter())
            .map(|c| c.tools.len())
            .sum()
    }
}

/// The whole catalog: an ordered list of domains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub domains: Vec<Domain>,
}

impl Catalog {
    pub fn domain(&self, id: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.id == id)
    }

    pub fn domain_ids(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(|d| d.id.as_str())
    }

    /// Check structural invariants: unique ids per level and scores in range.
    ///
    /// Tool ids only need to be unique inside their own component; the same
    /// id ("postgres", "docker") legitimately appears in several components.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut domain_ids = HashSet::new();
        for domain in &self.domains {
            if !domain_ids.insert(domain.id.as_str()) {
                return Err(CatalogError::DuplicateDomain(domain.id.clone()));
            }

            let mut subdomain_ids = HashSet::new();
            for sub in &domain.subdomains {
                if !subdomain_ids.insert(sub.id.as_str()) {
                    return Err(CatalogError::DuplicateSubdomain {
                        domain: domain.id.clone(),
                        subdomain: sub.id.clone(),
                    });
                }

                let mut component_ids = HashSet::new();
                for comp in &sub.components {
                    if !component_ids.insert(comp.id.as_str()) {
                        return Err(CatalogError::DuplicateComponent {
                            subdomain: sub.id.clone(),
                            component: comp.id.clone(),
                        });
                    }

                    let mut tool_ids = HashSet::new();
                    for tool in &comp.tools {
                        if !tool_ids.insert(tool.id.as_str()) {
                            return Err(CatalogError::DuplicateTool {
                                component: comp.id.clone(),
                                tool: tool.id.clone(),
                            });
                        }
                        for facet in Facet::ALL {
                            let value = tool.scores.get(facet);
                            if value > MAX_FACET_SCORE {
                                return Err(CatalogError::ScoreOutOfRange {
                                    tool: tool.id.clone(),
                                    facet,
                                    value,
                                });
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
