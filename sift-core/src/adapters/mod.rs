//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - CSV and JSON files for the TransactionSource port
//! - A JSON file for the InsightStore port

pub mod csv_source;
pub mod file_store;
pub mod json_source;

use std::path::Path;

use crate::config::CsvSettings;
use crate::ports::TransactionSource;

pub use csv_source::CsvTransactionSource;
pub use file_store::FileInsightStore;
pub use json_source::JsonTransactionSource;

/// Pick a transaction source from the file extension (`.json`, otherwise CSV)
pub fn open_source(path: &Path, csv: &CsvSettings) -> Box<dyn TransactionSource> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        Box::new(JsonTransactionSource::new(path))
    } else {
        Box::new(CsvTransactionSource::new(path, csv.clone()))
    }
}
