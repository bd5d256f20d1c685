//! Insight service - saved filter management

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::filter::Query;
use crate::domain::result::Error;
use crate::ports::{InsightStore, StoredInsight};

/// Insight service for saving and loading named queries
pub struct InsightService {
    store: Arc<dyn InsightStore>,
}

impl InsightService {
    pub fn new(store: Arc<dyn InsightStore>) -> Self {
        Self { store }
    }

    /// Save a query under its own name, replacing any previous version
    pub fn save(&self, query: &Query) -> Result<StoredInsight> {
        if query.name.trim().is_empty() {
            return Err(Error::validation("insight name cannot be empty").into());
        }
        let document = query.to_json()?;
        self.store.save(&query.name, &document)
    }

    /// Load a saved query
    ///
    /// Returns `Ok(None)` when the stored document no longer parses (for
    /// example, it was written by a newer version), so the caller can
    /// discard it.
    pub fn load(&self, name: &str) -> Result<Option<Query>> {
        let stored = self
            .store
            .get(name)?
            .ok_or_else(|| Error::not_found(format!("insight '{}'", name)))?;

        match Query::validate(&stored.document) {
            Ok(query) => Ok(Some(query)),
            Err(rejection) => {
                warn!(id = %stored.id, "stored insight is not readable");
                debug!(id = %stored.id, reason = %rejection, "insight rejection");
                Ok(None)
            }
        }
    }

    /// Raw stored document, without validation
    pub fn document(&self, name: &str) -> Result<StoredInsight> {
        Ok(self
            .store
            .get(name)?
            .ok_or_else(|| Error::not_found(format!("insight '{}'", name)))?)
    }

    /// Summaries of every saved insight, flagging unreadable ones
    pub fn list(&self) -> Result<Vec<InsightSummary>> {
        let insights = self.store.list()?;
        Ok(insights
            .into_iter()
            .map(|stored| {
                let parsed = Query::parse(&stored.document);
                InsightSummary {
                    id: stored.id,
                    name: stored.name,
                    updated_at: stored.updated_at,
                    valid: parsed.is_some(),
                    conditions: parsed.map(|q| q.len()),
                }
            })
            .collect())
    }

    pub fn remove(&self, name: &str) -> Result<bool> {
        self.store.remove(name)
    }
}

/// Listing entry for a saved insight
#[derive(Debug, Serialize)]
pub struct InsightSummary {
    pub id: Uuid,
    pub name: String,
    pub updated_at: DateTime<Utc>,
    /// Whether the stored document still parses
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<usize>,
}
