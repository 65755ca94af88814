//! Interactive selection session for one domain.
//!
//! A session owns the current selection and memoizes its analysis until the
//! next toggle. Sessions are ephemeral; only committed reports persist.

use std::cell::OnceCell;

use stackplan_types::analysis::AnalysisResult;
use stackplan_types::catalog::Catalog;
use stackplan_types::error::SelectionError;
use stackplan_types::ids::ItemId;
use stackplan_types::selection::Selection;
use tracing::debug;

use crate::analysis::analyze;
use crate::plan::commit::{CommitBundle, commit};
use crate::plan::store::PlanStore;
use crate::repository::plan::PlanRepository;

pub struct StackSession<'a> {
    catalog: &'a Catalog,
    domain_id: String,
    selection: Selection,
    analysis: OnceCell<AnalysisResult>,
}

impl<'a> StackSession<'a> {
    /// Start an empty session. Unknown domains are accepted; they analyze
    /// to the zero-value result and reject every toggle.
    pub fn new(catalog: &'a Catalog, domain_id: impl Into<String>) -> Self {
        Self {
            catalog,
            domain_id: domain_id.into(),
            selection: Selection::new(),
            analysis: OnceCell::new(),
        }
    }

    pub fn domain_id(&self) -> &str {
        &self.domain_id
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn total_selections(&self) -> usize {
        self.selection.total()
    }

    /// Analysis of the current selection, computed at most once per change.
    pub fn analysis(&self) -> &AnalysisResult {
        self.analysis
            .get_or_init(|| analyze(self.catalog, &self.selection, &self.domain_id))
    }

    /// Choose or unchoose a tool under its component's multiplicity policy.
    ///
    /// Returns whether the tool is selected afterwards.
    pub fn toggle_selection(
        &mut self,
        subdomain: &str,
        component: &str,
        tool: &str,
    ) -> Result<bool, SelectionError> {
        let domain = self
            .catalog
            .domain(&self.domain_id)
            .ok_or_else(|| SelectionError::UnknownDomain(self.domain_id.clone()))?;
        let sub = domain
            .subdomain(subdomain)
            .ok_or_else(|| SelectionError::UnknownSubdomain(subdomain.to_string()))?;
        let comp = sub
            .component(component)
            .ok_or_else(|| SelectionError::UnknownComponent {
                subdomain: subdomain.to_string(),
                component: component.to_string(),
            })?;
        if comp.tool(tool).is_none() {
            return Err(SelectionError::UnknownTool {
                component: component.to_string(),
                tool: tool.to_string(),
            });
        }

        let selected = self
            .selection
            .toggle(subdomain, component, tool, comp.multiplicity);
        self.analysis.take();
        debug!(domain = %self.domain_id, subdomain, component, tool, selected, "selection toggled");
        Ok(selected)
    }

    /// Remove a pick regardless of multiplicity. Returns whether it was selected.
    pub fn deselect(&mut self, subdomain: &str, component: &str, tool: &str) -> bool {
        let removed = self.selection.remove(subdomain, component, tool);
        if removed {
            self.analysis.take();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.selection = Selection::new();
        self.analysis.take();
    }

    /// Build the commit bundle for the current selection, if committable.
    pub fn commit(&self) -> Option<CommitBundle> {
        commit(self.catalog, &self.selection, self.analysis(), &self.domain_id)
    }

    /// Commit the current selection into `store`.
    ///
    /// Returns the new report group id, or `None` when the selection is not
    /// viable or empty (a no-op, not an error).
    pub fn commit_selection<R: PlanRepository>(&self, store: &PlanStore<R>) -> Option<ItemId> {
        let bundle = self.commit()?;
        Some(store.merge_commit(bundle))
    }
}
