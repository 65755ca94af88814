//! `analyze` and `commit` commands: build a selection from `--pick` flags,
//! run the analysis, and optionally commit it into the plan.

use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use stackplan_core::session::StackSession;
use stackplan_types::analysis::AnalysisResult;
use stackplan_types::catalog::{Catalog, Facet};

use crate::state::AppState;

/// One `--pick subdomain/component/tool` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    pub subdomain: String,
    pub component: String,
    pub tool: String,
}

/// clap value parser for [`Pick`].
pub fn parse_pick(raw: &str) -> Result<Pick, String> {
    let parts: Vec<&str> = raw.split('/').map(str::trim).collect();
    match parts.as_slice() {
        [sub, comp, tool] if !sub.is_empty() && !comp.is_empty() && !tool.is_empty() => Ok(Pick {
            subdomain: sub.to_string(),
            component: comp.to_string(),
            tool: tool.to_string(),
        }),
        _ => Err(format!(
            "expected subdomain/component/tool, got '{raw}'"
        )),
    }
}

/// Apply every pick to a fresh session, in argument order.
fn build_session<'a>(catalog: &'a Catalog, domain: &str, picks: &[Pick]) -> Result<StackSession<'a>> {
    if catalog.domain(domain).is_none() {
        bail!(
            "Unknown domain '{domain}'. Available: {}",
            catalog.domain_ids().collect::<Vec<_>>().join(", ")
        );
    }

    let mut session = StackSession::new(catalog, domain);
    for pick in picks {
        session
            .toggle_selection(&pick.subdomain, &pick.component, &pick.tool)
            .with_context(|| {
                format!(
                    "Invalid pick '{}/{}/{}'",
                    pick.subdomain, pick.component, pick.tool
                )
            })?;
    }
    Ok(session)
}

/// Analyze a selection and print the result. Nothing is saved.
pub fn handle_analyze(state: &AppState, domain: &str, picks: &[Pick], json: bool) -> Result<()> {
    let session = build_session(&state.catalog, domain, picks)?;
    let analysis = session.analysis();

    if json {
        println!("{}", serde_json::to_string_pretty(analysis)?);
        return Ok(());
    }

    print_analysis(domain, analysis);
    Ok(())
}

/// Analyze a selection and, when viable, commit it into the account's plan.
pub async fn handle_commit(
    state: &AppState,
    account: Option<&str>,
    domain: &str,
    picks: &[Pick],
    json: bool,
) -> Result<()> {
    let session = build_session(&state.catalog, domain, picks)?;
    state.sign_in(state.account(account)).await?;

    let Some(group_id) = session.commit_selection(&state.plan_store) else {
        if json {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "committed": false,
                    "analysis": session.analysis(),
                }))?
            );
        } else {
            print_analysis(domain, session.analysis());
            println!(
                "  {} Stack is not viable, nothing was committed.",
                style("!").yellow().bold()
            );
            println!();
        }
        return Ok(());
    };

    super::plan::flush(state).await?;

    let steps = state
        .plan_store
        .plan()
        .steps_in_group(&group_id)
        .count();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "committed": true,
                "groupId": group_id,
                "steps": steps,
                "analysis": session.analysis(),
            }))?
        );
    } else {
        println!();
        println!(
            "  {} Committed {} stack ({} steps, score {})",
            style("ok").green().bold(),
            style(domain).cyan(),
            steps,
            session.analysis().compatibility_score,
        );
        println!("  {} {}", style("Group:").dim(), group_id);
        println!();
    }
    Ok(())
}

fn print_analysis(domain: &str, analysis: &AnalysisResult) {
    println!();
    let score = analysis.compatibility_score;
    let score_styled = match score {
        70..=100 => style(score.to_string()).green().bold(),
        40..=69 => style(score.to_string()).yellow().bold(),
        _ => style(score.to_string()).red().bold(),
    };
    let verdict = if analysis.viable {
        style("viable").green()
    } else {
        style("not viable").red()
    };
    println!(
        "  {} {}  score {}  {}",
        style("Stack").bold(),
        style(domain).cyan(),
        score_styled,
        verdict
    );

    if analysis.picked.is_empty() {
        println!();
        println!("  {} No tools picked.", style("i").blue().bold());
    } else {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL_CONDENSED);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Subdomain").fg(Color::White),
            Cell::new("Component").fg(Color::White),
            Cell::new("Tool").fg(Color::White),
        ]);
        for picked in &analysis.picked {
            table.add_row(vec![
                Cell::new(&picked.subdomain).fg(Color::DarkGrey),
                Cell::new(&picked.component),
                Cell::new(&picked.tool.name).fg(Color::Cyan),
            ]);
        }
        println!();
        println!("{table}");

        let scores: Vec<String> = Facet::ALL
            .iter()
            .map(|f| format!("{f} {:.1}", analysis.aggregate_scores.get(*f)))
            .collect();
        println!("  {} {}", style("Averages:").dim(), scores.join("  "));

        let distribution: Vec<String> = analysis
            .distribution
            .iter()
            .map(|(sub, n)| format!("{sub}={n}"))
            .collect();
        println!("  {} {}", style("Spread:").dim(), distribution.join(" "));
    }

    if !analysis.role_hints.is_empty() {
        println!("  {} {}", style("Roles:").dim(), analysis.role_hints.join(", "));
    }

    if !analysis.warnings.is_empty() {
        println!();
        for warning in &analysis.warnings {
            println!("  {} {warning}", style("!").yellow().bold());
        }
    }
    if !analysis.suggestions.is_empty() {
        println!();
        for suggestion in &analysis.suggestions {
            println!("  {} {suggestion}", style("->").cyan());
        }
    }
    println!();
}
