//! Compatibility analysis: selection + catalog → [`AnalysisResult`].
//!
//! Everything here is a pure function of its inputs. Unknown domains and
//! stale selection entries degrade to smaller results instead of errors.

use std::collections::BTreeMap;

use stackplan_types::analysis::{AggregateScores, AnalysisResult, PickedTool};
use stackplan_types::catalog::{Catalog, Domain, Facet};
use stackplan_types::selection::Selection;
use tracing::{debug, warn};

use super::rules::{StackFacts, rules_for};

const VIABLE_BONUS: f64 = 10.0;
const WARNING_PENALTY: f64 = 5.0;
const FACET_WEIGHT: f64 = 3.0;

/// Analyze `selection` for the domain `domain_id` of `catalog`.
///
/// Returns the zero-value result when the catalog has no such domain.
pub fn analyze(catalog: &Catalog, selection: &Selection, domain_id: &str) -> AnalysisResult {
    let Some(domain) = catalog.domain(domain_id) else {
        warn!(domain = %domain_id, "analysis requested for unknown domain");
        return AnalysisResult::default();
    };
    analyze_domain(domain, selection)
}

/// Analyze `selection` against an already resolved domain.
pub fn analyze_domain(domain: &Domain, selection: &Selection) -> AnalysisResult {
    let picked = resolve(domain, selection);
    let rules = rules_for(&domain.id);
    let facts = StackFacts::new(&picked);

    let viable = (rules.is_viable)(&facts);
    let warnings = (rules.warnings)(&facts);
    let suggestions = (rules.suggestions)(&facts);
    // An empty stack never implies a role, whatever the domain's fallbacks say.
    let role_hints = if picked.is_empty() {
        Vec::new()
    } else {
        (rules.role_hints)(&facts, viable)
    };

    let aggregate_scores = aggregate(&picked);
    let compatibility_score = compatibility_score(&aggregate_scores, viable, warnings.len());
    let distribution = distribution(&picked);

    debug!(
        domain = %domain.id,
        picked = picked.len(),
        viable,
        score = compatibility_score,
        "stack analyzed"
    );

    AnalysisResult {
        picked,
        aggregate_scores,
        compatibility_score,
        viable,
        warnings,
        suggestions,
        role_hints,
        distribution,
    }
}

/// Resolve every selected id against the domain, in selection order.
///
/// Entries whose subdomain, component, or tool is missing are dropped.
pub fn resolve(domain: &Domain, selection: &Selection) -> Vec<PickedTool> {
    let mut picked = Vec::with_capacity(selection.total());
    for (sub_id, comp_id, tool_id) in selection.triples() {
        let Some(component) = domain.component(sub_id, comp_id) else {
            debug!(domain = %domain.id, subdomain = %sub_id, component = %comp_id, "dropping selection for missing component");
            continue;
        };
        let Some(tool) = component.tool(tool_id) else {
            debug!(domain = %domain.id, component = %comp_id, tool = %tool_id, "dropping selection for missing tool");
            continue;
        };
        picked.push(PickedTool {
            subdomain: sub_id.to_string(),
            component: comp_id.to_string(),
            kind: component.kind().to_string(),
            tool: tool.clone(),
        });
    }
    picked
}

/// Per-facet mean rounded to one decimal; all zero when nothing is picked.
pub fn aggregate(picked: &[PickedTool]) -> AggregateScores {
    let mut scores = AggregateScores::default();
    if picked.is_empty() {
        return scores;
    }
    let count = picked.len() as f64;
    for facet in Facet::ALL {
        let sum: f64 = picked.iter().map(|p| f64::from(p.tool.scores.get(facet))).sum();
        scores.set(facet, round_one_decimal(sum / count));
    }
    scores
}

/// `clamp(0, 100, round((performance + scalability + demand) * 3 ± 10 - 5 * warnings))`.
///
/// Uses the rounded aggregate so the score is reproducible from the
/// displayed numbers. Learning curve does not contribute.
pub fn compatibility_score(scores: &AggregateScores, viable: bool, warning_count: usize) -> u8 {
    let base = (scores.performance + scores.scalability + scores.demand) * FACET_WEIGHT;
    let bonus = if viable { VIABLE_BONUS } else { -VIABLE_BONUS };
    let raw = base + bonus - WARNING_PENALTY * warning_count as f64;
    raw.round().clamp(0.0, 100.0) as u8
}

/// Picked tool count per subdomain.
pub fn distribution(picked: &[PickedTool]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for p in picked {
        *counts.entry(p.subdomain.clone()).or_insert(0) += 1;
    }
    counts
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
