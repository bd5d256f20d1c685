//! Filter service - apply and explain queries

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::domain::filter::Query;
use crate::domain::{Lookups, Transaction};
use crate::ports::TransactionSource;

/// Runs queries over transaction sets
#[derive(Debug, Default)]
pub struct FilterService;

impl FilterService {
    pub fn new() -> Self {
        Self
    }

    /// Keep the transactions the query matches
    pub fn apply(&self, query: &Query, transactions: Vec<Transaction>) -> FilterResult {
        let total = transactions.len();
        let matched: Vec<Transaction> =
            transactions.into_iter().filter(|tx| query.matches(tx)).collect();
        debug!(total, matched = matched.len(), "applied filter");

        FilterResult {
            name: query.name.clone(),
            total,
            matched: matched.len(),
            transactions: matched,
        }
    }

    /// Load from a source and filter
    pub fn apply_source(
        &self,
        query: &Query,
        source: &dyn TransactionSource,
    ) -> Result<FilterResult> {
        let transactions = source.load()?;
        debug!(source = source.name(), count = transactions.len(), "loaded transactions");
        Ok(self.apply(query, transactions))
    }

    /// Human-readable expression for a query
    pub fn explain(&self, query: &Query, lookups: &Lookups) -> String {
        query.render(lookups)
    }
}

/// Outcome of filtering a transaction set
#[derive(Debug, Serialize)]
pub struct FilterResult {
    pub name: String,
    pub total: usize,
    pub matched: usize,
    pub transactions: Vec<Transaction>,
}
