//! Transaction source port

use anyhow::Result;

use crate::domain::Transaction;

/// Supplies the records a filter is evaluated against
pub trait TransactionSource {
    /// Short name for diagnostics (e.g., "csv", "json")
    fn name(&self) -> &str;

    /// Load every available transaction
    fn load(&self) -> Result<Vec<Transaction>>;
}
