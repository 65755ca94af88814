//! `plan` subcommands: show the tracked plan and edit its entries.
//!
//! Every mutating subcommand flushes the store with `save_now` before the
//! process exits, so the debounce window never drops a change.

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use stackplan_core::plan::SaveOutcome;
use stackplan_types::ids::ItemId;
use stackplan_types::plan::PlanItem;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum PlanCommand {
    /// Show the plan with progress.
    Show,

    /// Flip the done flag of a step.
    Toggle {
        /// Step id.
        id: String,
    },

    /// Remove a single entry.
    Remove {
        /// Entry id.
        id: String,
    },

    /// Remove a committed stack report and all of its steps.
    RemoveGroup {
        /// Report group id (shown as "Group" in `plan show`).
        group_id: String,
    },

    /// Remove every entry.
    Clear {
        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_plan_command(
    cmd: PlanCommand,
    state: &AppState,
    account: Option<&str>,
    json: bool,
) -> Result<()> {
    state.sign_in(state.account(account)).await?;

    match cmd {
        PlanCommand::Show => show_plan(state, json),
        PlanCommand::Toggle { id } => {
            let id = ItemId::from(id.as_str());
            if !state.plan_store.toggle_item(&id) {
                bail!("No step with id '{id}'");
            }
            flush(state).await?;
            let done = state
                .plan_store
                .plan()
                .find(&id)
                .and_then(PlanItem::as_step)
                .is_some_and(|s| s.done);
            report(json, "toggled", &id, serde_json::json!({ "done": done }), || {
                let mark = if done { "done" } else { "open" };
                format!("Step {} marked {mark}", style(&id).cyan())
            })
        }
        PlanCommand::Remove { id } => {
            let id = ItemId::from(id.as_str());
            if !state.plan_store.remove_item(&id) {
                bail!("No entry with id '{id}'");
            }
            flush(state).await?;
            report(json, "removed", &id, serde_json::json!({}), || {
                format!("Removed {}", style(&id).cyan())
            })
        }
        PlanCommand::RemoveGroup { group_id } => {
            let group_id = ItemId::from(group_id.as_str());
            let removed = state.plan_store.remove_group(&group_id);
            if removed == 0 {
                bail!("No entries in group '{group_id}'");
            }
            flush(state).await?;
            report(json, "removed", &group_id, serde_json::json!({ "count": removed }), || {
                format!("Removed {removed} entries from group {}", style(&group_id).cyan())
            })
        }
        PlanCommand::Clear { force } => {
            let total = state.plan_store.plan().items.len();
            if total == 0 {
                bail!("Plan is already empty");
            }
            if !force && !json {
                let confirmed = dialoguer::Confirm::new()
                    .with_prompt(format!("Remove all {total} plan entries?"))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("  Cancelled.");
                    return Ok(());
                }
            }
            let removed = state.plan_store.clear_all();
            flush(state).await?;
            let account = state.plan_store.account().map(|a| a.to_string()).unwrap_or_default();
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "status": "cleared",
                        "count": removed,
                        "account": account,
                    }))?
                );
            } else {
                println!();
                println!(
                    "  {} Cleared {removed} entries for {}",
                    style("ok").green().bold(),
                    style(account).cyan()
                );
                println!();
            }
            Ok(())
        }
    }
}

/// Write pending changes now. Errors keep the store's dirty state intact.
pub async fn flush(state: &AppState) -> Result<()> {
    match state.plan_store.save_now().await.context("Failed to save plan")? {
        SaveOutcome::Saved => Ok(()),
        SaveOutcome::Deferred => {
            // Another write was in flight; it re-saves the current plan when done.
            tracing::debug!("save deferred to follow-up write");
            Ok(())
        }
    }
}

fn report(
    json: bool,
    status: &str,
    id: &ItemId,
    extra: serde_json::Value,
    text: impl FnOnce() -> String,
) -> Result<()> {
    if json {
        let mut body = serde_json::json!({ "status": status, "id": id });
        if let (Some(body), serde_json::Value::Object(extra)) = (body.as_object_mut(), extra) {
            body.extend(extra);
        }
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!();
        println!("  {} {}", style("ok").green().bold(), text());
        println!();
    }
    Ok(())
}

fn show_plan(state: &AppState, json: bool) -> Result<()> {
    let view = state.plan_store.view();

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!();
    let account = view.account.as_ref().map(ToString::to_string).unwrap_or_default();
    println!(
        "  {} {}",
        style(if view.title.is_empty() { "Plan" } else { view.title.as_str() }).bold(),
        style(format!("({account})")).dim()
    );
    if view.legacy {
        println!(
            "  {} Converted from a day-based plan; the next save rewrites it.",
            style("i").blue().bold()
        );
    }

    if view.items.is_empty() {
        println!();
        println!("  {} The plan is empty.", style("i").blue().bold());
        println!(
            "  Commit a stack with: {}",
            style("stackplan commit <domain> --pick sub/comp/tool").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("").fg(Color::White),
        Cell::new("Entry").fg(Color::White),
        Cell::new("Domain").fg(Color::White),
        Cell::new("Id").fg(Color::White),
    ]);

    for item in &view.items {
        match item {
            PlanItem::StackReport(entry) => {
                let report = &entry.report;
                let verdict = if report.analysis.viable { "viable" } else { "not viable" };
                table.add_row(vec![
                    Cell::new("#").fg(Color::Magenta),
                    Cell::new(format!(
                        "Stack report: score {}, {verdict}, {} tools",
                        report.analysis.compatibility_score,
                        report.analysis.picked.len()
                    ))
                    .fg(Color::Magenta),
                    Cell::new(&report.domain),
                    Cell::new(format!("Group {}", report.id)).fg(Color::DarkGrey),
                ]);
            }
            PlanItem::Step(step) => {
                let (mark, color) = if step.done {
                    ("x", Color::Green)
                } else {
                    (" ", Color::White)
                };
                table.add_row(vec![
                    Cell::new(format!("[{mark}]")).fg(color),
                    Cell::new(&step.step),
                    Cell::new(&step.domain),
                    Cell::new(&step.id).fg(Color::DarkGrey),
                ]);
            }
        }
    }

    println!();
    println!("{table}");

    let progress = view.progress;
    let percent = if progress.total == 0 {
        0
    } else {
        progress.done * 100 / progress.total
    };
    println!(
        "  {} {}/{} steps done ({percent}%)",
        style("Progress:").dim(),
        progress.done,
        progress.total
    );
    if let Some(saved) = view.last_saved_at {
        println!("  {} {}", style("Saved:").dim(), saved.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(err) = &view.last_error {
        println!("  {} {err}", style("Last error:").red());
    }
    println!();
    Ok(())
}
