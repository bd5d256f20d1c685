//! Configuration management
//!
//! Settings live in `settings.json` inside the sift directory:
//! ```json
//! {
//!   "lookupsPath": "/path/to/lookups.json",
//!   "csv": { "columnMappings": { "amount": "Amount", ... }, "dateFormat": "%d/%m/%Y" }
//! }
//! ```
//! Keys this crate does not manage are preserved when saving.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lookups_path: Option<PathBuf>,
    #[serde(default)]
    csv: CsvSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Sift configuration (simplified view of settings)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub lookups_path: Option<PathBuf>,
    pub csv: CsvSettings,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Config {
    /// Load config from the sift directory
    ///
    /// The lookups path can be overridden with `SIFT_LOOKUPS`. A settings
    /// file that fails to parse is ignored.
    pub fn load(sift_dir: &Path) -> Result<Self> {
        let settings_path = sift_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = ?settings_path, error = %e, "ignoring unreadable settings file");
                SettingsFile::default()
            })
        } else {
            SettingsFile::default()
        };

        let lookups_path = match std::env::var("SIFT_LOOKUPS").ok().filter(|v| !v.is_empty()) {
            Some(path) => Some(PathBuf::from(path)),
            None => raw.lookups_path.clone(),
        };

        Ok(Self {
            lookups_path,
            csv: raw.csv.clone(),
            _raw_settings: raw,
        })
    }

    /// Save config to the sift directory
    /// Preserves other settings that sift doesn't manage
    pub fn save(&self, sift_dir: &Path) -> Result<()> {
        let settings_path = sift_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            self._raw_settings.clone()
        };

        settings.lookups_path = self.lookups_path.clone();
        settings.csv = self.csv.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }
}

/// How CSV transaction exports are read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvSettings {
    #[serde(default)]
    pub column_mappings: ColumnMappings,
    /// Explicit chrono format; detected from the data when absent
    #[serde(default)]
    pub date_format: Option<String>,
}

/// Column headers for each transaction field
///
/// Optional columns that are missing from a file are treated as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnMappings {
    pub id: String,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub category: String,
    pub parent_category: Option<String>,
    pub source_account: String,
    pub destination_account: Option<String>,
    pub amount: String,
    pub destination_amount: Option<String>,
    pub tags: Option<String>,
    pub geo_location: Option<String>,
    pub pictures: Option<String>,
    pub description: Option<String>,
}

impl Default for ColumnMappings {
    fn default() -> Self {
        Self {
            id: "Id".to_string(),
            date: Some("Date".to_string()),
            transaction_type: "Type".to_string(),
            category: "Category".to_string(),
            parent_category: Some("Parent Category".to_string()),
            source_account: "Account".to_string(),
            destination_account: Some("Destination Account".to_string()),
            amount: "Amount".to_string(),
            destination_amount: Some("Destination Amount".to_string()),
            tags: Some("Tags".to_string()),
            geo_location: Some("Location".to_string()),
            pictures: Some("Pictures".to_string()),
            description: Some("Description".to_string()),
        }
    }
}
