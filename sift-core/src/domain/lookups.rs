//! Display-name lookup tables used when rendering filters

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::result::Result;

/// id -> display name maps for categories, accounts and tags
///
/// Only consulted at render time. A missing entry is never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookups {
    #[serde(default)]
    pub categories: HashMap<String, String>,
    #[serde(default)]
    pub accounts: HashMap<String, String>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl Lookups {
    /// Load lookups from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn category(&self, id: &str) -> Option<&str> {
        self.categories.get(id).map(String::as_str)
    }

    pub fn account(&self, id: &str) -> Option<&str> {
        self.accounts.get(id).map(String::as_str)
    }

    pub fn tag(&self, id: &str) -> Option<&str> {
        self.tags.get(id).map(String::as_str)
    }
}
