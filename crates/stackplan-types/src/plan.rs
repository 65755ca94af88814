//! Plan types: the persisted, per-account tracked plan.
//!
//! Two shapes exist on the wire:
//!
//! - the current `items` shape: a newest-first list of [`PlanItem`]s;
//! - the legacy `days` shape: dated days, each with plain task strings.
//!
//! [`PlanDocument`] is the raw persisted document and may carry either.
//! [`PlanDocument::classify`] is the single boundary where the shape is
//! inspected; everything past it works on an [`ItemPlan`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::ids::ItemId;
use crate::selection::Selection;

/// Free-form metadata map attached to plans and steps.
pub type Meta = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// One actionable entry in the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepItem {
    pub id: ItemId,
    /// Embedded id of the stack report this step was committed with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<ItemId>,
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Display text, e.g. `"Framework: React"`.
    pub step: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub meta: Meta,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "timestamp::deserialize_opt"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// Snapshot of one analysis outcome, frozen at commit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackReport {
    /// Group id shared by the steps committed alongside this report.
    pub id: ItemId,
    pub domain: String,
    #[serde(alias = "selected")]
    pub selection: Selection,
    pub analysis: AnalysisResult,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

/// Plan entry wrapping a [`StackReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackReportItem {
    pub id: ItemId,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    pub report: StackReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlanItem {
    #[serde(rename = "step")]
    Step(StepItem),
    #[serde(rename = "stack-report")]
    StackReport(StackReportItem),
}

impl PlanItem {
    /// The entry's own id (for a stack report, the item id, not the group id).
    pub fn id(&self) -> &ItemId {
        match self {
            PlanItem::Step(step) => &step.id,
            PlanItem::StackReport(report) => &report.id,
        }
    }

    /// Whether this entry belongs to the report group `group_id`.
    pub fn in_group(&self, group_id: &ItemId) -> bool {
        match self {
            PlanItem::Step(step) => step.group_id.as_ref() == Some(group_id),
            PlanItem::StackReport(item) => &item.report.id == group_id,
        }
    }

    pub fn as_step(&self) -> Option<&StepItem> {
        match self {
            PlanItem::Step(step) => Some(step),
            PlanItem::StackReport(_) => None,
        }
    }

    pub fn as_stack_report(&self) -> Option<&StackReportItem> {
        match self {
            PlanItem::StackReport(item) => Some(item),
            PlanItem::Step(_) => None,
        }
    }
}

/// Timestamps are written as RFC 3339 but older documents carry epoch
/// milliseconds, so both are accepted on read.
mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Text(String),
    }

    fn convert<E: Error>(raw: Raw) -> Result<DateTime<Utc>, E> {
        match raw {
            Raw::Millis(ms) => DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| E::custom(format!("timestamp out of range: {ms}"))),
            Raw::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(E::custom),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        convert(Raw::deserialize(d)?)
    }

    pub fn deserialize_opt<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<Raw>::deserialize(d)?.map(convert).transpose()
    }
}

// ---------------------------------------------------------------------------
// Legacy day shape
// ---------------------------------------------------------------------------

/// A day in the legacy plan shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyDay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Plain task strings.
    #[serde(rename = "items", alias = "tasks", default)]
    pub tasks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyDayPlan {
    pub title: String,
    pub days: Vec<LegacyDay>,
    pub meta: Meta,
}

/// One-way migration from the legacy day shape.
///
/// Every task becomes an undone step with id `day-{d}::{t}`. Steps keep day
/// order, then task order.
pub fn to_item_plan(legacy: LegacyDayPlan) -> ItemPlan {
    let items = legacy
        .days
        .iter()
        .enumerate()
        .flat_map(|(day_index, day)| {
            let domain = day
                .domain
                .clone()
                .unwrap_or_else(|| format!("Day {}", day.date.as_deref().unwrap_or("")));
            let created_at = day.date.as_deref().and_then(parse_day_date);
            day.tasks
                .iter()
                .enumerate()
                .map(move |(task_index, task)| {
                    PlanItem::Step(StepItem {
                        id: ItemId::legacy(day_index, task_index),
                        group_id: None,
                        domain: domain.clone(),
                        subdomain: None,
                        component: None,
                        step: task.clone(),
                        done: false,
                        meta: Meta::new(),
                        created_at,
                    })
                })
        })
        .collect();

    ItemPlan {
        title: legacy.title,
        items,
        meta: legacy.meta,
    }
}

impl From<LegacyDayPlan> for ItemPlan {
    fn from(legacy: LegacyDayPlan) -> Self {
        to_item_plan(legacy)
    }
}

/// Accept RFC 3339 timestamps or bare `YYYY-MM-DD` dates.
fn parse_day_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Item plan
// ---------------------------------------------------------------------------

/// Completion counts over step entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanProgress {
    pub done: usize,
    pub total: usize,
}

/// The plan in its current shape. All store mutations operate on this.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPlan {
    pub title: String,
    /// Newest first.
    pub items: Vec<PlanItem>,
    pub meta: Meta,
}

impl ItemPlan {
    /// Flip `done` on the step with this id. Stack reports are not toggleable.
    pub fn toggle_item(&mut self, id: &ItemId) -> bool {
        for item in &mut self.items {
            if let PlanItem::Step(step) = item {
                if &step.id == id {
                    step.done = !step.done;
                    return true;
                }
            }
        }
        false
    }

    /// Remove the single entry with this id. Returns whether one was removed.
    pub fn remove_item(&mut self, id: &ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        self.items.len() != before
    }

    /// Remove the stack report whose embedded id is `group_id` together with
    /// every step carrying that group id. Returns the number removed.
    pub fn remove_group(&mut self, group_id: &ItemId) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !item.in_group(group_id));
        before - self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Put `entries` ahead of the existing items, preserving their order.
    pub fn prepend(&mut self, entries: Vec<PlanItem>) {
        let mut merged = entries;
        merged.append(&mut self.items);
        self.items = merged;
    }

    pub fn find(&self, id: &ItemId) -> Option<&PlanItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn progress(&self) -> PlanProgress {
        let steps = self.items.iter().filter_map(PlanItem::as_step);
        let (done, total) = steps.fold((0, 0), |(done, total), step| {
            (done + usize::from(step.done), total + 1)
        });
        PlanProgress { done, total }
    }

    pub fn stack_reports(&self) -> impl Iterator<Item = &StackReportItem> {
        self.items.iter().filter_map(PlanItem::as_stack_report)
    }

    pub fn steps_in_group<'a>(&'a self, group_id: &'a ItemId) -> impl Iterator<Item = &'a StepItem> {
        self.items
            .iter()
            .filter_map(PlanItem::as_step)
            .filter(move |step| step.group_id.as_ref() == Some(group_id))
    }

    /// The persisted form. Always the `items` shape; `days` is never written.
    pub fn to_document(&self) -> PlanDocument {
        PlanDocument {
            title: self.title.clone(),
            items: Some(self.items.clone()),
            days: None,
            meta: self.meta.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Persisted document
// ---------------------------------------------------------------------------

/// Raw persisted plan document. Missing fields fall back to the empty default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<PlanItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<LegacyDay>>,
    #[serde(default)]
    pub meta: Meta,
}

/// A loaded plan, tagged by the shape it was stored in.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredPlan {
    Legacy(LegacyDayPlan),
    Items(ItemPlan),
}

impl StoredPlan {
    pub fn is_legacy(&self) -> bool {
        matches!(self, StoredPlan::Legacy(_))
    }

    /// Collapse to the item shape, migrating legacy plans.
    pub fn into_item_plan(self) -> ItemPlan {
        match self {
            StoredPlan::Legacy(legacy) => to_item_plan(legacy),
            StoredPlan::Items(plan) => plan,
        }
    }
}

impl PlanDocument {
    /// Decide which shape this document is in.
    ///
    /// Legacy only when there are no items and at least one day.
    pub fn classify(self) -> StoredPlan {
        let items = self.items.unwrap_or_default();
        match self.days {
            Some(days) if items.is_empty() && !days.is_empty() => {
                StoredPlan::Legacy(LegacyDayPlan {
                    title: self.title,
                    days,
                    meta: self.meta,
                })
            }
            _ => StoredPlan::Items(ItemPlan {
                title: self.title,
                items,
                meta: self.meta,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: &str, group: Option<&str>) -> PlanItem {
        PlanItem::Step(StepItem {
            id: ItemId::from(id),
            group_id: group.map(ItemId::from),
            domain: "web".to_string(),
            subdomain: Some("frontend".to_string()),
            component: Some("framework".to_string()),
            step: format!("Framework: {id}"),
            done: false,
            meta: Meta::new(),
            created_at: None,
        })
    }

    fn report(item_id: &str, group: &str) -> PlanItem {
        let now = Utc::now();
        PlanItem::StackReport(StackReportItem {
            id: ItemId::from(item_id),
            created_at: now,
            report: StackReport {
                id: ItemId::from(group),
                domain: "web".to_string(),
                selection: Selection::new(),
                analysis: AnalysisResult::default(),
                created_at: now,
            },
        })
    }

    fn sample_plan() -> ItemPlan {
        ItemPlan {
            title: String::new(),
            items: vec![
                report("r1", "g1"),
                step("s1", Some("g1")),
                step("s2", Some("g1")),
                report("r2", "g2"),
                step("s3", Some("g2")),
                step("loose", None),
            ],
            meta: Meta::new(),
        }
    }

    #[test]
    fn plan_item_tagged_by_type() {
        let json = serde_json::to_value(step("s1", Some("g1"))).unwrap();
        assert_eq!(json["type"], "step");
        assert_eq!(json["groupId"], "g1");

        let json = serde_json::to_value(report("r1", "g1")).unwrap();
        assert_eq!(json["type"], "stack-report");
        assert_eq!(json["report"]["id"], "g1");
    }

    #[test]
    fn toggle_flips_step_done() {
        let mut plan = sample_plan();
        assert!(plan.toggle_item(&ItemId::from("s2")));
        assert_eq!(plan.progress(), PlanProgress { done: 1, total: 4 });
        assert!(plan.toggle_item(&ItemId::from("s2")));
        assert_eq!(plan.progress().done, 0);
    }

    #[test]
    fn toggle_ignores_reports_and_unknown_ids() {
        let mut plan = sample_plan();
        assert!(!plan.toggle_item(&ItemId::from("r1")));
        assert!(!plan.toggle_item(&ItemId::from("missing")));
    }

    #[test]
    fn remove_group_removes_report_and_its_steps_only() {
        let mut plan = sample_plan();
        let removed = plan.remove_group(&ItemId::from("g1"));
        assert_eq!(removed, 3);

        let ids: Vec<&str> = plan.items.iter().map(|i| i.id().as_str()).collect();
        assert_eq!(ids, vec!["r2", "s3", "loose"]);
    }

    #[test]
    fn remove_group_by_item_id_is_noop() {
        let mut plan = sample_plan();
        assert_eq!(plan.remove_group(&ItemId::from("r1")), 0);
        assert_eq!(plan.items.len(), 6);
    }

    #[test]
    fn remove_item_removes_only_that_entry() {
        let mut plan = sample_plan();
        assert!(plan.remove_item(&ItemId::from("r1")));
        assert_eq!(plan.items.len(), 5);
        assert_eq!(plan.steps_in_group(&ItemId::from("g1")).count(), 2);
        assert!(!plan.remove_item(&ItemId::from("r1")));
    }

    #[test]
    fn prepend_puts_entries_first() {
        let mut plan = sample_plan();
        plan.prepend(vec![report("r3", "g3"), step("s4", Some("g3"))]);
        let ids: Vec<&str> = plan.items.iter().take(3).map(|i| i.id().as_str()).collect();
        assert_eq!(ids, vec!["r3", "s4", "r1"]);
        assert_eq!(plan.stack_reports().count(), 3);
    }

    #[test]
    fn classify_items_document() {
        let doc = PlanDocument {
            items: Some(vec![step("s1", None)]),
            days: Some(vec![LegacyDay {
                tasks: vec!["ignored".to_string()],
                ..Default::default()
            }]),
            ..Default::default()
        };
        let stored = doc.classify();
        assert!(!stored.is_legacy());
        assert_eq!(stored.into_item_plan().items.len(), 1);
    }

    #[test]
    fn classify_days_only_document_as_legacy() {
        let doc: PlanDocument = serde_json::from_value(serde_json::json!({
            "title": "Old plan",
            "days": [
                {"date": "2024-03-01", "items": ["Semantic HTML", "Flexbox/Grid"]},
                {"date": "2024-03-02", "domain": "web", "items": ["ES6+"]}
            ]
        }))
        .unwrap();

        let stored = doc.classify();
        assert!(stored.is_legacy());

        let plan = stored.into_item_plan();
        assert_eq!(plan.title, "Old plan");
        assert_eq!(plan.items.len(), 3);
        assert!(plan.items.iter().all(|i| !i.as_step().unwrap().done));

        let first = plan.items[0].as_step().unwrap();
        assert_eq!(first.id.as_str(), "day-0::0");
        assert_eq!(first.domain, "Day 2024-03-01");
        assert_eq!(first.step, "Semantic HTML");
        assert!(first.created_at.is_some());

        let third = plan.items[2].as_step().unwrap();
        assert_eq!(third.id.as_str(), "day-1::0");
        assert_eq!(third.domain, "web");
    }

    #[test]
    fn classify_empty_document_as_empty_items() {
        let doc: PlanDocument = serde_json::from_str("{}").unwrap();
        let stored = doc.classify();
        assert_eq!(stored, StoredPlan::Items(ItemPlan::default()));
    }

    #[test]
    fn to_document_never_writes_days() {
        let legacy = LegacyDayPlan {
            title: String::new(),
            days: vec![LegacyDay {
                date: Some("not a date".to_string()),
                tasks: vec!["Joins".to_string()],
                ..Default::default()
            }],
            meta: Meta::new(),
        };
        let plan = to_item_plan(legacy);
        assert!(plan.items[0].as_step().unwrap().created_at.is_none());

        let json = serde_json::to_value(plan.to_document()).unwrap();
        assert!(json.get("days").is_none());
        assert_eq!(json["items"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn epoch_millis_timestamps_are_accepted() {
        let raw = serde_json::json!({
            "type": "step",
            "id": "s1",
            "domain": "web",
            "step": "Framework: React",
            "createdAt": 1_700_000_000_000_i64
        });
        let item: PlanItem = serde_json::from_value(raw).unwrap();
        let created = item.as_step().unwrap().created_at.unwrap();
        assert_eq!(created.timestamp_millis(), 1_700_000_000_000);

        let json = serde_json::to_value(&item).unwrap();
        assert!(json["createdAt"].is_string());
    }
}
