//! Filter command - run a query over a transaction file

use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;
use sift_core::adapters::open_source;
use sift_core::services::FilterResult;
use sift_core::{format_amount, Lookups, Transaction};

use super::{get_context, load_query};
use crate::output::{self, create_table, csv_field};

const HEADERS: [&str; 8] = [
    "Id",
    "Date",
    "Type",
    "Category",
    "Account",
    "Amount",
    "Tags",
    "Description",
];

/// How matched transactions are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

pub fn run(
    path: Option<&Path>,
    saved: Option<&str>,
    transactions: &Path,
    format: OutputFormat,
) -> Result<()> {
    let ctx = get_context()?;
    let query = load_query(&ctx, path, saved)?;

    let source = open_source(transactions, &ctx.config.csv);
    let result = ctx.filter_service.apply_source(&query, source.as_ref())?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Csv => {
            // raw ids, so the output can be joined back to the source
            println!("{}", HEADERS.join(","));
            for tx in &result.transactions {
                let values: Vec<String> = row(tx, &Lookups::default())
                    .iter()
                    .map(|v| csv_field(v))
                    .collect();
                println!("{}", values.join(","));
            }
        }
        OutputFormat::Table => print_table(&result, &ctx.lookups()?),
    }

    Ok(())
}

fn print_table(result: &FilterResult, lookups: &Lookups) {
    if result.transactions.is_empty() {
        output::warning(&format!(
            "No transactions matched '{}' ({} checked)",
            result.name, result.total
        ));
        return;
    }

    let mut table = create_table();
    table.set_header(HEADERS);
    for tx in &result.transactions {
        table.add_row(row(tx, lookups));
    }

    println!("{}", table);
    println!();
    println!("{} of {} transaction(s) matched", result.matched, result.total);
}

/// Display cells, with names from lookups where known
fn row(tx: &Transaction, lookups: &Lookups) -> Vec<String> {
    let category = lookups.category(&tx.category_id).unwrap_or(&tx.category_id);
    let account = lookups.account(&tx.source_account_id).unwrap_or(&tx.source_account_id);
    let tags: Vec<&str> = tx.tag_ids.iter().map(|id| lookups.tag(id).unwrap_or(id)).collect();

    vec![
        tx.id.clone(),
        tx.date.map(|d| d.to_string()).unwrap_or_default(),
        tx.transaction_type.to_string(),
        category.to_string(),
        account.to_string(),
        format_amount(tx.source_amount),
        tags.join("; "),
        tx.description.clone(),
    ]
}
