//! Explain command - show the expression a query evaluates

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use sift_core::Lookups;

use super::{get_context, load_query};

pub fn run(
    path: Option<&Path>,
    saved: Option<&str>,
    lookups: Option<&Path>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    let query = load_query(&ctx, path, saved)?;
    let lookups = match lookups {
        Some(p) => Lookups::load(p)?,
        None => ctx.lookups()?,
    };

    let expression = ctx.filter_service.explain(&query, &lookups);

    if json {
        let out = json!({
            "name": query.name,
            "conditions": query.len(),
            "expression": expression,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", query.name.bold());
    if expression.is_empty() {
        println!("  {}", "(no conditions: matches every transaction)".dimmed());
    } else {
        println!("  {}", expression);
    }
    Ok(())
}
