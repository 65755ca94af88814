//! Turning a viable selection into plan entries.

use chrono::{DateTime, Utc};
use serde_json::Value;
use stackplan_types::analysis::AnalysisResult;
use stackplan_types::catalog::Catalog;
use stackplan_types::ids::ItemId;
use stackplan_types::plan::{Meta, PlanItem, StackReport, StackReportItem, StepItem};
use stackplan_types::selection::Selection;
use tracing::debug;

/// Entries produced by one commit: a report and its steps.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitBundle {
    pub stack_report: StackReportItem,
    pub steps: Vec<StepItem>,
}

impl CommitBundle {
    /// Group id shared by the report snapshot and every step.
    pub fn group_id(&self) -> &ItemId {
        &self.stack_report.report.id
    }

    /// Entries in plan order: the report first, then steps in selection order.
    pub fn into_items(self) -> Vec<PlanItem> {
        let mut items = Vec::with_capacity(self.steps.len() + 1);
        items.push(PlanItem::StackReport(self.stack_report));
        items.extend(self.steps.into_iter().map(PlanItem::Step));
        items
    }
}

/// Build a commit bundle stamped with the current time.
///
/// Returns `None` when the analysis is not viable or nothing is selected.
pub fn commit(
    catalog: &Catalog,
    selection: &Selection,
    analysis: &AnalysisResult,
    domain_id: &str,
) -> Option<CommitBundle> {
    commit_at(catalog, selection, analysis, domain_id, Utc::now())
}

/// Like [`commit`] with an explicit creation time shared by every entry.
pub fn commit_at(
    catalog: &Catalog,
    selection: &Selection,
    analysis: &AnalysisResult,
    domain_id: &str,
    created_at: DateTime<Utc>,
) -> Option<CommitBundle> {
    if !analysis.viable || selection.is_empty() {
        debug!(domain = %domain_id, viable = analysis.viable, "ignoring commit of non-committable selection");
        return None;
    }
    let domain = catalog.domain(domain_id)?;
    let group_id = ItemId::new();

    let mut steps = Vec::with_capacity(selection.total());
    for (sub_id, comp_id, tool_id) in selection.triples() {
        let Some(component) = domain.component(sub_id, comp_id) else {
            continue;
        };
        let Some(tool) = component.tool(tool_id) else {
            continue;
        };

        let mut meta = Meta::new();
        meta.insert("toolId".to_string(), Value::String(tool.id.clone()));
        meta.insert(
            "tags".to_string(),
            Value::Array(tool.tags.iter().cloned().map(Value::String).collect()),
        );

        steps.push(StepItem {
            id: ItemId::new(),
            group_id: Some(group_id.clone()),
            domain: domain_id.to_string(),
            subdomain: Some(sub_id.to_string()),
            component: Some(comp_id.to_string()),
            step: format!("{}: {}", component.title, tool.name),
            done: false,
            meta,
            created_at: Some(created_at),
        });
    }

    let stack_report = StackReportItem {
        id: ItemId::new(),
        created_at,
        report: StackReport {
            id: group_id,
            domain: domain_id.to_string(),
            selection: selection.clone(),
            analysis: analysis.clone(),
            created_at,
        },
    };

    debug!(domain = %domain_id, group_id = %stack_report.report.id, steps = steps.len(), "selection committed");
    Some(CommitBundle {
        stack_report,
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use stackplan_types::catalog::{Component, Domain, Multiplicity, ScoreVector, Subdomain, Tool};

    fn tool(id: &str, name: &str) -> Tool {
        Tool {
            id: id.to_string(),
            name: name.to_string(),
            tags: vec!["tag".to_string()],
            scores: ScoreVector {
                performance: 8,
                scalability: 8,
                learning: 7,
                demand: 10,
            },
        }
    }

    fn catalog() -> Catalog {
        let comp = |id: &str, title: &str, kind: Option<&str>, multiplicity, tools| Component {
            id: id.to_string(),
            title: title.to_string(),
            kind: kind.map(str::to_string),
            multiplicity,
            tools,
        };
        let sub = |id: &str, components| Subdomain {
            id: id.to_string(),
            title: id.to_string(),
            components,
        };
        Catalog {
            domains: vec![Domain {
                id: "web".to_string(),
                title: "Web".to_string(),
                subdomains: vec![
                    sub(
                        "frontend",
                        vec![
                            comp("framework", "Framework", None, Multiplicity::Single, vec![tool("react", "React")]),
                            comp(
                                "styling",
                                "Styling",
                                None,
                                Multiplicity::Multi,
                                vec![tool("tailwind", "Tailwind CSS"), tool("sass", "Sass")],
                            ),
                        ],
                    ),
                    sub(
                        "backend",
                        vec![comp("runtime", "Runtime", None, Multiplicity::Single, vec![tool("node", "Node.js")])],
                    ),
                    sub(
                        "database",
                        vec![comp("engine", "DB Engine", Some("db"), Multiplicity::Single, vec![tool("postgres", "PostgreSQL")])],
                    ),
                ],
            }],
        }
    }

    fn selection() -> Selection {
        Selection::from_triples([
            ("frontend", "framework", "react"),
            ("frontend", "styling", "tailwind"),
            ("frontend", "styling", "sass"),
            ("backend", "runtime", "node"),
            ("database", "engine", "postgres"),
        ])
    }

    #[test]
    fn one_step_per_resolved_triple_sharing_group_and_time() {
        let catalog = catalog();
        let selection = selection();
        let analysis = analyze(&catalog, &selection, "web");
        let now = Utc::now();

        let bundle = commit_at(&catalog, &selection, &analysis, "web", now).unwrap();
        assert_eq!(bundle.steps.len(), 5);
        let gid = bundle.group_id().clone();
        for step in &bundle.steps {
            assert_eq!(step.group_id.as_ref(), Some(&gid));
            assert_eq!(step.created_at, Some(now));
            assert!(!step.done);
            assert_eq!(step.domain, "web");
        }
        assert_eq!(bundle.stack_report.created_at, now);
        assert_eq!(bundle.stack_report.report.created_at, now);
        assert_ne!(bundle.stack_report.id, gid);
    }

    #[test]
    fn step_text_and_meta() {
        let catalog = catalog();
        let selection = selection();
        let analysis = analyze(&catalog, &selection, "web");
        let bundle = commit(&catalog, &selection, &analysis, "web").unwrap();

        let texts: Vec<_> = bundle.steps.iter().map(|s| s.step.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Runtime: Node.js",
                "DB Engine: PostgreSQL",
                "Framework: React",
                "Styling: Tailwind CSS",
                "Styling: Sass",
            ]
        );
        assert_eq!(bundle.steps[0].meta["toolId"], "node");
        assert_eq!(bundle.steps[0].meta["tags"], serde_json::json!(["tag"]));
    }

    #[test]
    fn report_snapshot_is_frozen() {
        let catalog = catalog();
        let mut selection = selection();
        let analysis = analyze(&catalog, &selection, "web");
        let bundle = commit(&catalog, &selection, &analysis, "web").unwrap();

        selection.remove("backend", "runtime", "node");
        assert_eq!(bundle.stack_report.report.analysis, analysis);
        assert!(bundle.stack_report.report.selection.contains("backend", "runtime", "node"));
    }

    #[test]
    fn non_viable_or_empty_is_noop() {
        let catalog = catalog();
        let partial = Selection::from_triples([("frontend", "framework", "react")]);
        let analysis = analyze(&catalog, &partial, "web");
        assert!(!analysis.viable);
        assert!(commit(&catalog, &partial, &analysis, "web").is_none());

        let viable = analyze(&catalog, &selection(), "web");
        assert!(commit(&catalog, &Selection::new(), &viable, "web").is_none());
    }

    #[test]
    fn stale_entries_are_skipped() {
        let catalog = catalog();
        let mut selection = selection();
        selection.insert("frontend", "framework", "svelte");
        let analysis = analyze(&catalog, &selection, "web");
        let bundle = commit(&catalog, &selection, &analysis, "web").unwrap();
        assert_eq!(bundle.steps.len(), analysis.picked.len());
    }

    #[test]
    fn into_items_puts_report_first() {
        let catalog = catalog();
        let selection = selection();
        let analysis = analyze(&catalog, &selection, "web");
        let items = commit(&catalog, &selection, &analysis, "web").unwrap().into_items();
        assert_eq!(items.len(), 6);
        assert!(items[0].as_stack_report().is_some());
        assert!(items[1..].iter().all(|i| i.as_step().is_some()));
    }
}
