//! Transaction domain model
//!
//! The read-only view of a ledger entry that filters are evaluated against.
//! Amounts are signed integers in hundredths of the currency unit.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of transaction, with the stable numeric codes used in stored filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    ModifyBalance,
    Income,
    Expense,
    Transfer,
}

impl TransactionType {
    pub const ALL: [TransactionType; 4] = [
        TransactionType::ModifyBalance,
        TransactionType::Income,
        TransactionType::Expense,
        TransactionType::Transfer,
    ];

    /// Numeric code as persisted in query documents
    pub fn code(self) -> i64 {
        match self {
            TransactionType::ModifyBalance => 1,
            TransactionType::Income => 2,
            TransactionType::Expense => 3,
            TransactionType::Transfer => 4,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Display name used in rendered expressions
    pub fn name(self) -> &'static str {
        match self {
            TransactionType::ModifyBalance => "ModifyBalance",
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
            TransactionType::Transfer => "Transfer",
        }
    }

    /// Parse a loose, case-insensitive name (CSV input)
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "modifybalance" | "balance" => Some(TransactionType::ModifyBalance),
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            "transfer" => Some(TransactionType::Transfer),
            _ => normalized.parse().ok().and_then(Self::from_code),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Geographic position attached to a transaction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// A single financial transaction as seen by the filter engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Secondary (leaf) category
    pub category_id: String,
    /// Primary category the leaf belongs to
    #[serde(default)]
    pub parent_category_id: Option<String>,
    pub source_account_id: String,
    /// Only set for transfers
    #[serde(default)]
    pub destination_account_id: Option<String>,
    pub source_amount: i64,
    #[serde(default)]
    pub destination_amount: i64,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    #[serde(default)]
    pub geo_location: Option<GeoLocation>,
    #[serde(default)]
    pub picture_ids: Option<Vec<String>>,
    #[serde(default)]
    pub description: String,
}

impl Transaction {
    /// Create a transaction with required fields
    pub fn new(
        id: impl Into<String>,
        transaction_type: TransactionType,
        category_id: impl Into<String>,
        source_account_id: impl Into<String>,
        source_amount: i64,
    ) -> Self {
        Self {
            id: id.into(),
            date: None,
            transaction_type,
            category_id: category_id.into(),
            parent_category_id: None,
            source_account_id: source_account_id.into(),
            destination_account_id: None,
            source_amount,
            destination_amount: 0,
            tag_ids: Vec::new(),
            geo_location: None,
            picture_ids: None,
            description: String::new(),
        }
    }

    pub fn has_pictures(&self) -> bool {
        self.picture_ids.as_ref().is_some_and(|p| !p.is_empty())
    }

    /// Normalize tags: deduplicate, trim whitespace, remove empty
    pub fn normalize_tags(tags: &[String]) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut result = Vec::new();

        for tag in tags {
            let trimmed = tag.trim().to_string();
            if !trimmed.is_empty() && seen.insert(trimmed.clone()) {
                result.push(trimmed);
            }
        }

        result
    }
}

/// Hundredths as a two-decimal amount, e.g. `-1200.50`
pub fn format_amount(minor: i64) -> String {
    format!("{:.2}", Decimal::new(minor, 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(12345), "123.45");
        assert_eq!(format_amount(-5), "-0.05");
        assert_eq!(format_amount(0), "0.00");
        assert_eq!(format_amount(-120050), "-1200.50");
    }

    #[test]
    fn test_type_codes_roundtrip() {
        for t in TransactionType::ALL {
            assert_eq!(TransactionType::from_code(t.code()), Some(t));
        }
        assert_eq!(TransactionType::from_code(0), None);
        assert_eq!(TransactionType::from_code(9), None);
    }

    #[test]
    fn test_type_from_name() {
        assert_eq!(TransactionType::from_name("Expense"), Some(TransactionType::Expense));
        assert_eq!(
            TransactionType::from_name(" modify_balance "),
            Some(TransactionType::ModifyBalance)
        );
        assert_eq!(TransactionType::from_name("4"), Some(TransactionType::Transfer));
        assert_eq!(TransactionType::from_name("refund"), None);
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let tx: Transaction = serde_json::from_str(
            r#"{"id":"t1","type":"expense","category_id":"c1","source_account_id":"a1","source_amount":-1250}"#,
        )
        .unwrap();
        assert_eq!(tx.transaction_type, TransactionType::Expense);
        assert_eq!(tx.source_amount, -1250);
        assert!(tx.tag_ids.is_empty());
        assert!(!tx.has_pictures());
        assert_eq!(tx.description, "");
    }

    #[test]
    fn test_tag_normalization() {
        let tags = vec![
            "food".to_string(),
            "  groceries ".to_string(),
            "food".to_string(),
            "".to_string(),
        ];
        let normalized = Transaction::normalize_tags(&tags);
        assert_eq!(normalized, vec!["food", "groceries"]);
    }
}
