//! Selection state: which tools a user picked, per subdomain and component.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Multiplicity;

/// Mapping `subdomain id → component id → chosen tool ids`.
///
/// Tool ids keep the order they were chosen in. Empty component and
/// subdomain entries are pruned, so an empty map means nothing is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeMap<String, BTreeMap<String, Vec<String>>>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from `(subdomain, component, tool)` triples without
    /// applying any multiplicity policy.
    pub fn from_triples<'a>(triples: impl IntoIterator<Item = (&'a str, &'a str, &'a str)>) -> Self {
        let mut selection = Self::new();
        for (sub, comp, tool) in triples {
            selection.insert(sub, comp, tool);
        }
        selection
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of chosen tool ids across every component.
    pub fn total(&self) -> usize {
        self.0
            .values()
            .flat_map(|comps| comps.values())
            .map(Vec::len)
            .sum()
    }

    /// Tool ids chosen for a component (empty slice when none).
    pub fn tools(&self, subdomain: &str, component: &str) -> &[String] {
        self.0
            .get(subdomain)
            .and_then(|comps| comps.get(component))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, subdomain: &str, component: &str, tool: &str) -> bool {
        self.tools(subdomain, component).iter().any(|t| t == tool)
    }

    /// Append a tool id if it is not already chosen. No multiplicity policy.
    pub fn insert(&mut self, subdomain: &str, component: &str, tool: &str) {
        let ids = self
            .0
            .entry(subdomain.to_string())
            .or_default()
            .entry(component.to_string())
            .or_default();
        if !ids.iter().any(|t| t == tool) {
            ids.push(tool.to_string());
        }
    }

    /// Apply a toggle under the component's multiplicity policy.
    ///
    /// - `Multi`: adds the tool if absent, removes it if present.
    /// - `Single`: the component ends up holding exactly this tool; a prior
    ///   choice is replaced in one assignment. Re-choosing the current tool
    ///   keeps it selected.
    ///
    /// Returns whether the tool is selected afterwards.
    pub fn toggle(
        &mut self,
        subdomain: &str,
        component: &str,
        tool: &str,
        multiplicity: Multiplicity,
    ) -> bool {
        match multiplicity {
            Multiplicity::Multi => {
                if self.contains(subdomain, component, tool) {
                    self.remove(subdomain, component, tool);
                    false
                } else {
                    self.insert(subdomain, component, tool);
                    true
                }
            }
            Multiplicity::Single => {
                self.0
                    .entry(subdomain.to_string())
                    .or_default()
                    .insert(component.to_string(), vec![tool.to_string()]);
                true
            }
        }
    }

    /// Remove a chosen tool regardless of multiplicity. Returns whether it was present.
    pub fn remove(&mut self, subdomain: &str, component: &str, tool: &str) -> bool {
        let Some(comps) = self.0.get_mut(subdomain) else {
            return false;
        };
        let Some(ids) = comps.get_mut(component) else {
            return false;
        };
        let before = ids.len();
        ids.retain(|t| t != tool);
        let removed = ids.len() != before;

        if ids.is_empty() {
            comps.remove(component);
        }
        if comps.is_empty() {
            self.0.remove(subdomain);
        }
        removed
    }

    /// Iterate every `(subdomain, component, tool)` triple in map order.
    pub fn triples(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.0.iter().flat_map(|(sub, comps)| {
            comps.iter().flat_map(move |(comp, ids)| {
                ids.iter()
                    .map(move |id| (sub.as_str(), comp.as_str(), id.as_str()))
            })
        })
    }
}
