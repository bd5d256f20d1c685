//! CSV transaction source
//!
//! Reads an exported ledger using the configured column mappings. Amounts
//! are parsed as decimals and scaled to hundredths. Multi-valued cells
//! (tags, pictures) are `;`-separated and locations are `lat,lon`.
//! Rows that cannot be read are skipped with a warning.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, warn};

use crate::config::{ColumnMappings, CsvSettings};
use crate::domain::{GeoLocation, Transaction, TransactionType};
use crate::ports::TransactionSource;
use crate::services::format::{detect_amount_format, detect_date_formats, AmountFormat};

/// Resolved column positions for one file
struct Columns {
    id: usize,
    date: Option<usize>,
    transaction_type: usize,
    category: usize,
    parent_category: Option<usize>,
    source_account: usize,
    destination_account: Option<usize>,
    amount: usize,
    destination_amount: Option<usize>,
    tags: Option<usize>,
    geo_location: Option<usize>,
    pictures: Option<usize>,
    description: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord, mappings: &ColumnMappings) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let required =
            |name: &str| find(name).with_context(|| format!("Column '{}' not found", name));
        let optional = |name: &Option<String>| name.as_deref().and_then(find);

        Ok(Self {
            id: required(&mappings.id)?,
            date: optional(&mappings.date),
            transaction_type: required(&mappings.transaction_type)?,
            category: required(&mappings.category)?,
            parent_category: optional(&mappings.parent_category),
            source_account: required(&mappings.source_account)?,
            destination_account: optional(&mappings.destination_account),
            amount: required(&mappings.amount)?,
            destination_amount: optional(&mappings.destination_amount),
            tags: optional(&mappings.tags),
            geo_location: optional(&mappings.geo_location),
            pictures: optional(&mappings.pictures),
            description: optional(&mappings.description),
        })
    }
}

/// Transactions from a CSV export
pub struct CsvTransactionSource {
    path: PathBuf,
    settings: CsvSettings,
}

impl CsvTransactionSource {
    pub fn new(path: impl Into<PathBuf>, settings: CsvSettings) -> Self {
        Self {
            path: path.into(),
            settings,
        }
    }
}

impl TransactionSource for CsvTransactionSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn load(&self) -> Result<Vec<Transaction>> {
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("Failed to read CSV file: {:?}", self.path))?;
        let headers = reader.headers()?.clone();
        let columns = Columns::resolve(&headers, &self.settings.column_mappings)?;

        let rows: Vec<StringRecord> = reader.records().collect::<std::result::Result<_, _>>()?;

        let amount_samples: Vec<&str> = rows
            .iter()
            .flat_map(|row| {
                let destination = columns.destination_amount.and_then(|i| row.get(i));
                row.get(columns.amount).into_iter().chain(destination)
            })
            .collect();
        let amount_format =
            detect_amount_format(&amount_samples).unwrap_or(AmountFormat::DotDecimal);

        let date_format = match (&self.settings.date_format, columns.date) {
            (Some(format), _) => Some(format.clone()),
            (None, Some(idx)) => {
                let samples: Vec<&str> = rows.iter().filter_map(|row| row.get(idx)).collect();
                detect_date_formats(&samples).first().map(|f| f.to_string())
            }
            (None, None) => None,
        };
        debug!(?amount_format, ?date_format, rows = rows.len(), "reading csv transactions");

        let mut transactions = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            match parse_row(row, &columns, amount_format, date_format.as_deref()) {
                Some(tx) => transactions.push(tx),
                // +2: header line and 1-based numbering
                None => warn!(line = index + 2, "skipping unreadable transaction row"),
            }
        }

        Ok(transactions)
    }
}

fn parse_row(
    row: &StringRecord,
    columns: &Columns,
    amount_format: AmountFormat,
    date_format: Option<&str>,
) -> Option<Transaction> {
    let cell = |idx: usize| row.get(idx).map(str::trim).unwrap_or("");
    let optional_cell = |idx: Option<usize>| idx.map(cell).filter(|s| !s.is_empty());

    let id = cell(columns.id);
    if id.is_empty() {
        return None;
    }
    let transaction_type = TransactionType::from_name(cell(columns.transaction_type))?;
    let source_amount = amount_format.parse_scaled(cell(columns.amount))?;

    let mut tx = Transaction::new(
        id,
        transaction_type,
        cell(columns.category),
        cell(columns.source_account),
        source_amount,
    );

    tx.date = match (optional_cell(columns.date), date_format) {
        (Some(text), Some(format)) => Some(NaiveDate::parse_from_str(text, format).ok()?),
        (Some(_), None) => return None,
        (None, _) => None,
    };
    tx.parent_category_id = optional_cell(columns.parent_category).map(str::to_string);
    tx.destination_account_id = optional_cell(columns.destination_account).map(str::to_string);
    if let Some(text) = optional_cell(columns.destination_amount) {
        tx.destination_amount = amount_format.parse_scaled(text)?;
    }
    if let Some(text) = optional_cell(columns.tags) {
        tx.tag_ids = Transaction::normalize_tags(&split_list(text));
    }
    if let Some(text) = optional_cell(columns.geo_location) {
        tx.geo_location = Some(parse_geo(text)?);
    }
    if let Some(text) = optional_cell(columns.pictures) {
        tx.picture_ids = Some(split_list(text));
    }
    if let Some(text) = optional_cell(columns.description) {
        tx.description = text.to_string();
    }

    Some(tx)
}

fn split_list(text: &str) -> Vec<String> {
    text.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_geo(text: &str) -> Option<GeoLocation> {
    let (lat, lon) = text.split_once(',')?;
    let latitude: f64 = lat.trim().parse().ok()?;
    let longitude: f64 = lon.trim().parse().ok()?;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }
    Some(GeoLocation {
        latitude,
        longitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_row() {
        let file = write_csv(
            "Id,Date,Type,Category,Parent Category,Account,Destination Account,Amount,Destination Amount,Tags,Location,Pictures,Description\n\
             t1,2024-03-01,Expense,coffee,food,checking,,\"1,250.00\",,work; morning,\"47.6,-122.3\",p1;p2,Blue Bottle\n",
        );
        let source = CsvTransactionSource::new(file.path(), CsvSettings::default());
        let txs = source.load().unwrap();
        assert_eq!(txs.len(), 1);

        let tx = &txs[0];
        assert_eq!(tx.id, "t1");
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(tx.transaction_type, TransactionType::Expense);
        assert_eq!(tx.parent_category_id.as_deref(), Some("food"));
        assert_eq!(tx.destination_account_id, None);
        assert_eq!(tx.source_amount, 125000);
        assert_eq!(tx.destination_amount, 0);
        assert_eq!(tx.tag_ids, vec!["work", "morning"]);
        assert_eq!(tx.geo_location, Some(GeoLocation { latitude: 47.6, longitude: -122.3 }));
        assert_eq!(tx.picture_ids, Some(vec!["p1".to_string(), "p2".to_string()]));
        assert_eq!(tx.description, "Blue Bottle");
    }

    #[test]
    fn test_minimal_columns_and_skipped_rows() {
        let file = write_csv(
            "Id,Type,Category,Account,Amount\n\
             t1,income,salary,checking,3000\n\
             t2,refund,misc,checking,10\n\
             ,expense,misc,checking,10\n\
             t4,transfer,,checking,abc\n\
             t5,expense,rent,checking,-1200.5\n",
        );
        let source = CsvTransactionSource::new(file.path(), CsvSettings::default());
        let txs = source.load().unwrap();
        let ids: Vec<&str> = txs.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t5"]);
        assert_eq!(txs[1].source_amount, -120050);
        assert!(txs[0].tag_ids.is_empty());
        assert!(txs[0].picture_ids.is_none());
    }

    #[test]
    fn test_missing_required_column() {
        let file = write_csv("Id,Type,Category,Account\nt1,expense,c,a\n");
        let source = CsvTransactionSource::new(file.path(), CsvSettings::default());
        let err = source.load().unwrap_err();
        assert!(err.to_string().contains("Amount"));
    }

    #[test]
    fn test_detected_day_first_dates() {
        let file = write_csv(
            "Id,Date,Type,Category,Account,Amount\n\
             t1,01/02/2024,expense,c,a,1\n\
             t2,25/02/2024,expense,c,a,1\n",
        );
        let source = CsvTransactionSource::new(file.path(), CsvSettings::default());
        let txs = source.load().unwrap();
        assert_eq!(txs[0].date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(txs[1].date, NaiveDate::from_ymd_opt(2024, 2, 25));
    }

    #[test]
    fn test_bad_date_cell_skips_only_its_row() {
        let file = write_csv(
            "Id,Date,Type,Category,Account,Amount\n\
             t1,2024-01-15,expense,c,a,1\n\
             t2,2024-01-16,expense,c,a,2\n\
             t3,n/a,expense,c,a,3\n",
        );
        let source = CsvTransactionSource::new(file.path(), CsvSettings::default());
        let txs = source.load().unwrap();
        let ids: Vec<&str> = txs.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
        assert_eq!(txs[1].date, NaiveDate::from_ymd_opt(2024, 1, 16));
    }

    #[test]
    fn test_bad_amount_cell_skips_only_its_row() {
        let file = write_csv(
            "Id,Type,Category,Account,Amount\n\
             t1,expense,c,a,\"1.234,56\"\n\
             t2,expense,c,a,\"12,50\"\n\
             t3,expense,c,a,n/a\n",
        );
        let source = CsvTransactionSource::new(file.path(), CsvSettings::default());
        let txs = source.load().unwrap();
        let amounts: Vec<(&str, i64)> =
            txs.iter().map(|t| (t.id.as_str(), t.source_amount)).collect();
        assert_eq!(amounts, vec![("t1", 123456), ("t2", 1250)]);
    }

    #[test]
    fn test_parse_geo_bounds() {
        assert!(parse_geo("91.0,0").is_none());
        assert!(parse_geo("nope").is_none());
        assert_eq!(parse_geo(" 1.5 , 2 "), Some(GeoLocation { latitude: 1.5, longitude: 2.0 }));
    }
}
