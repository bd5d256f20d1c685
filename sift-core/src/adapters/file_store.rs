//! JSON file insight store
//!
//! All saved insights live in a single `insights.json` next to
//! `settings.json`. Every write replaces the file atomically.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use crate::ports::{InsightStore, StoredInsight};

const STORE_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct InsightsFile {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    insights: Vec<StoredInsight>,
}

/// Insight store backed by a JSON file
pub struct FileInsightStore {
    path: PathBuf,
}

impl FileInsightStore {
    /// Store in `insights.json` inside the sift directory
    pub fn new(sift_dir: &Path) -> Self {
        Self {
            path: sift_dir.join("insights.json"),
        }
    }

    fn read_all(&self) -> Result<Vec<StoredInsight>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read insight store: {:?}", self.path))?;
        let file: InsightsFile = serde_json::from_str(&content)
            .with_context(|| format!("Insight store is corrupt: {:?}", self.path))?;
        debug!(count = file.insights.len(), "loaded insight store");
        Ok(file.insights)
    }

    fn write_all(&self, mut insights: Vec<StoredInsight>) -> Result<()> {
        insights.sort_by(|a, b| a.name.cmp(&b.name));

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {:?}", dir))?;

        let file = InsightsFile {
            version: STORE_VERSION,
            insights,
        };
        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, &file)?;
        tmp.write_all(b"\n")?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to write insight store: {:?}", self.path))?;
        Ok(())
    }
}

impl InsightStore for FileInsightStore {
    fn list(&self) -> Result<Vec<StoredInsight>> {
        let mut insights = self.read_all()?;
        insights.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(insights)
    }

    fn get(&self, name: &str) -> Result<Option<StoredInsight>> {
        Ok(self.read_all()?.into_iter().find(|i| i.name == name))
    }

    fn save(&self, name: &str, document: &str) -> Result<StoredInsight> {
        let mut insights = self.read_all()?;
        let now = Utc::now();

        let saved = match insights.iter_mut().find(|i| i.name == name) {
            Some(existing) => {
                existing.document = document.to_string();
                existing.updated_at = now;
                existing.clone()
            }
            None => {
                let insight = StoredInsight {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                    document: document.to_string(),
                    updated_at: now,
                };
                insights.push(insight.clone());
                insight
            }
        };

        self.write_all(insights)?;
        info!(id = %saved.id, "saved insight");
        Ok(saved)
    }

    fn remove(&self, name: &str) -> Result<bool> {
        let mut insights = self.read_all()?;
        let before = insights.len();
        insights.retain(|i| i.name != name);
        if insights.len() == before {
            return Ok(false);
        }
        self.write_all(insights)?;
        info!("removed insight");
        Ok(true)
    }
}
