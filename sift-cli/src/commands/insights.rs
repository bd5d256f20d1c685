//! Insights command - manage saved queries

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use serde_json::json;
use sift_core::Query;

use super::{get_context, read_document};
use crate::output;

#[derive(Subcommand)]
pub enum InsightsCommands {
    /// List saved insights
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a saved insight
    Show {
        /// Insight name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save a query document as an insight
    Save {
        /// Query document path, or - for stdin
        file: Option<PathBuf>,
        /// Save under this name instead of the document's own
        #[arg(long)]
        name: Option<String>,
    },
    /// Remove a saved insight
    Remove {
        /// Insight name
        name: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

pub fn run(command: InsightsCommands) -> Result<()> {
    let ctx = get_context()?;
    let service = &ctx.insight_service;

    match command {
        InsightsCommands::List { json } => {
            let insights = service.list()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&insights)?);
                return Ok(());
            }

            if insights.is_empty() {
                output::info("No saved insights. Save one with: sift insights save <FILE>");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Name", "Conditions", "Updated", "Status"]);
            for insight in &insights {
                let status = if insight.valid {
                    "ok".green().to_string()
                } else {
                    "unreadable".red().to_string()
                };
                table.add_row(vec![
                    insight.name.clone(),
                    insight.conditions.map(|n| n.to_string()).unwrap_or_else(|| "-".into()),
                    insight.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                    status,
                ]);
            }
            println!("{}", table);
        }

        InsightsCommands::Show { name, json } => {
            let stored = service.document(&name)?;
            let query = service.load(&name)?;
            let expression = match &query {
                Some(q) => Some(ctx.filter_service.explain(q, &ctx.lookups()?)),
                None => None,
            };

            if json {
                let document: serde_json::Value =
                    serde_json::from_str(&stored.document).unwrap_or(serde_json::Value::Null);
                let out = json!({
                    "id": stored.id,
                    "name": stored.name,
                    "updatedAt": stored.updated_at,
                    "valid": query.is_some(),
                    "expression": expression,
                    "document": document,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
                return Ok(());
            }

            println!("{}", stored.name.bold());
            println!("  {} {}", "Updated:".dimmed(), stored.updated_at.format("%Y-%m-%d %H:%M"));
            match expression {
                Some(e) if e.is_empty() => {
                    println!("  {}", "(no conditions: matches every transaction)".dimmed())
                }
                Some(e) => println!("  {}", e),
                None => output::warning(
                    "  This insight can no longer be read. Save it again to replace it.",
                ),
            }
        }

        InsightsCommands::Save { file, name } => {
            let text = read_document(file.as_deref())?;
            let mut query = Query::validate(&text)
                .map_err(|rejection| anyhow!("Invalid query document: {}", rejection))?;
            if let Some(name) = name {
                query.name = name;
            }

            let saved = service.save(&query)?;
            output::success(&format!(
                "✓ Saved insight '{}' ({} condition(s))",
                saved.name,
                query.len()
            ));
        }

        InsightsCommands::Remove { name, force } => {
            if !force {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Remove insight '{}'?", name))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("Cancelled");
                    return Ok(());
                }
            }

            if service.remove(&name)? {
                output::success(&format!("✓ Removed insight '{}'", name));
            } else {
                output::warning(&format!("No insight named '{}'", name));
            }
        }
    }

    Ok(())
}
