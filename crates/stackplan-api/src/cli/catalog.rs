//! Catalog browsing commands: `domains` and `tools`.

use anyhow::{Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use stackplan_core::analysis::rules::is_recognized;

use crate::state::AppState;

/// List every domain in the catalog.
pub fn list_domains(state: &AppState, json: bool) -> Result<()> {
    let domains = &state.catalog.domains;

    if json {
        let rows: Vec<_> = domains
            .iter()
            .map(|d| {
                serde_json::json!({
                    "id": d.id,
                    "title": d.title,
                    "subdomains": d.subdomains.len(),
                    "tools": d.tool_count(),
                    "rules": is_recognized(&d.id),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if domains.is_empty() {
        println!();
        println!("  {} The catalog has no domains.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Domain").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Subdomains").fg(Color::White),
        Cell::new("Tools").fg(Color::White),
    ]);

    for domain in domains {
        let id_cell = if is_recognized(&domain.id) {
            Cell::new(&domain.id).fg(Color::Cyan)
        } else {
            // Domains without rules are never viable.
            Cell::new(&domain.id).fg(Color::DarkGrey)
        };
        table.add_row(vec![
            id_cell,
            Cell::new(&domain.title),
            Cell::new(domain.subdomains.len()),
            Cell::new(domain.tool_count()),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

/// Show the component tree of one domain with tool scores.
pub fn show_tools(state: &AppState, domain_id: &str, json: bool) -> Result<()> {
    let Some(domain) = state.catalog.domain(domain_id) else {
        bail!(
            "Unknown domain '{domain_id}'. Available: {}",
            state.catalog.domain_ids().collect::<Vec<_>>().join(", ")
        );
    };

    if json {
        println!("{}", serde_json::to_string_pretty(domain)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} ({})",
        style(&domain.title).bold(),
        style(&domain.id).cyan()
    );

    for sub in &domain.subdomains {
        println!();
        println!("  {}", style(&sub.title).bold().underlined());

        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL_CONDENSED);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Pick as").fg(Color::White),
            Cell::new("Tool").fg(Color::White),
            Cell::new("Perf").fg(Color::White),
            Cell::new("Scale").fg(Color::White),
            Cell::new("Learn").fg(Color::White),
            Cell::new("Demand").fg(Color::White),
        ]);

        for comp in &sub.components {
            let mode = if comp.is_multi() { "any" } else { "one" };
            println!(
                "    {} {}",
                style(&comp.title).cyan(),
                style(format!("[{}, pick {mode}]", comp.kind())).dim()
            );
            for tool in &comp.tools {
                table.add_row(vec![
                    Cell::new(format!("{}/{}/{}", sub.id, comp.id, tool.id)).fg(Color::DarkGrey),
                    Cell::new(&tool.name),
                    Cell::new(tool.scores.performance),
                    Cell::new(tool.scores.scalability),
                    Cell::new(tool.scores.learning),
                    Cell::new(tool.scores.demand),
                ]);
            }
        }
        println!("{table}");
    }
    println!();
    Ok(())
}
