//! JSON transaction source
//!
//! Reads a file holding a JSON array of transaction records.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use crate::domain::Transaction;
use crate::ports::TransactionSource;

/// Transactions from a JSON array
pub struct JsonTransactionSource {
    path: PathBuf,
}

impl JsonTransactionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TransactionSource for JsonTransactionSource {
    fn name(&self) -> &str {
        "json"
    }

    fn load(&self) -> Result<Vec<Transaction>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read transactions file: {:?}", self.path))?;
        let transactions: Vec<Transaction> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid transactions file: {:?}", self.path))?;
        debug!(count = transactions.len(), "loaded json transactions");
        Ok(transactions)
    }
}
