//! Analysis result types produced by the compatibility engine.
//!
//! An `AnalysisResult` is derived from a catalog and a selection and is
//! never persisted on its own; it only survives as part of a committed
//! stack report snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Facet, Tool};

/// A selected tool id resolved against the catalog, with its location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickedTool {
    pub subdomain: String,
    pub component: String,
    /// Effective component kind (the component's `type`, or its id).
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub tool: Tool,
}

/// Per-facet mean over the picked tools, rounded to one decimal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateScores {
    pub performance: f64,
    pub scalability: f64,
    pub learning: f64,
    pub demand: f64,
}

impl AggregateScores {
    pub fn get(&self, facet: Facet) -> f64 {
        match facet {
            Facet::Performance => self.performance,
            Facet::Scalability => self.scalability,
            Facet::Learning => self.learning,
            Facet::Demand => self.demand,
        }
    }

    pub fn set(&mut self, facet: Facet, value: f64) {
        match facet {
            Facet::Performance => self.performance = value,
            Facet::Scalability => self.scalability = value,
            Facet::Learning => self.learning = value,
            Facet::Demand => self.demand = value,
        }
    }
}

/// Outcome of analysing one selection for one domain.
///
/// `Default` is the zero-value result returned for unknown domains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub picked: Vec<PickedTool>,
    pub aggregate_scores: AggregateScores,
    /// Integer in `[0, 100]`.
    pub compatibility_score: u8,
    pub viable: bool,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    /// Inferred role labels, in rule order. Not deduplicated.
    pub role_hints: Vec<String>,
    /// Count of picked tools per subdomain id.
    pub distribution: BTreeMap<String, usize>,
}

impl AnalysisResult {
    /// Whether a commit would be accepted for this result.
    pub fn is_committable(&self) -> bool {
        self.viable && !self.picked.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ScoreVector;

    #[test]
    fn default_is_zero_value() {
        let result = AnalysisResult::default();
        assert!(!result.viable);
        assert_eq!(result.compatibility_score, 0);
        assert!(result.picked.is_empty());
        assert!(result.role_hints.is_empty());
        assert_eq!(result.aggregate_scores, AggregateScores::default());
        assert!(!result.is_committable());
    }

    #[test]
    fn picked_tool_flattens_tool_fields() {
        let picked = PickedTool {
            subdomain: "database".to_string(),
            component: "engine".to_string(),
            kind: "db".to_string(),
            tool: Tool {
                id: "postgres".to_string(),
                name: "PostgreSQL".to_string(),
                tags: vec!["sql".to_string()],
                scores: ScoreVector {
                    performance: 8,
                    scalability: 8,
                    learning: 6,
                    demand: 10,
                },
            },
        };
        let json = serde_json::to_value(&picked).unwrap();
        assert_eq!(json["type"], "db");
        assert_eq!(json["id"], "postgres");
        assert_eq!(json["scores"]["demand"], 10);

        let back: PickedTool = serde_json::from_value(json).unwrap();
        assert_eq!(back, picked);
    }

    #[test]
    fn result_uses_camel_case_keys() {
        let json = serde_json::to_value(AnalysisResult::default()).unwrap();
        assert!(json.get("compatibilityScore").is_some());
        assert!(json.get("aggregateScores").is_some());
        assert!(json.get("roleHints").is_some());
    }

    #[test]
    fn aggregate_get_set_by_facet() {
        let mut agg = AggregateScores::default();
        agg.set(Facet::Learning, 6.5);
        assert_eq!(agg.get(Facet::Learning), 6.5);
        assert_eq!(agg.get(Facet::Demand), 0.0);
    }
}
