//! Check command - validate a query document

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use sift_core::{OperationResult, Query};

use super::read_document;
use crate::output;

pub fn run(path: Option<&Path>, json: bool) -> Result<ExitCode> {
    let text = read_document(path)?;

    match Query::validate(&text) {
        Ok(query) => {
            if json {
                let relations: Vec<&str> =
                    query.conditions().iter().map(|c| c.relation.token()).collect();
                let result = OperationResult::ok(json!({
                    "name": query.name,
                    "conditions": query.len(),
                    "relations": relations,
                }));
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                output::success(&format!("✓ '{}' is a valid query", query.name));
                println!("  {} condition(s)", query.len());
                for (i, container) in query.conditions().iter().enumerate() {
                    println!(
                        "  {}. {} {}",
                        i + 1,
                        container.condition.field().token().bold(),
                        container.condition.operator().symbol()
                    );
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(rejection) => {
            if json {
                let result: OperationResult<()> = OperationResult::fail(rejection.to_string());
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                output::error(&format!("✗ {}", rejection));
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
