//! Sift Core - saved transaction filters for personal finance
//!
//! This crate implements the filter engine following hexagonal architecture:
//!
//! - **domain**: Transactions, lookups and the filter engine itself
//! - **ports**: Trait definitions for external collaborators (TransactionSource, InsightStore)
//! - **services**: Use-case orchestration (saving insights, applying filters, format detection)
//! - **adapters**: Concrete implementations (CSV/JSON files, JSON insight store)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use adapters::FileInsightStore;
use config::Config;
use services::*;

// Re-export commonly used types at crate root
pub use domain::filter::{Condition, ConditionContainer, Field, Operator, Query, Relation};
pub use domain::result::{Error, OperationResult};
pub use domain::{format_amount, Lookups, Transaction, TransactionType};

/// Main context for Sift operations
///
/// Holds the configuration and the services wired to the on-disk store.
pub struct SiftContext {
    pub sift_dir: PathBuf,
    pub config: Config,
    pub insight_service: InsightService,
    pub filter_service: FilterService,
}

impl SiftContext {
    /// Create a new Sift context rooted at `sift_dir`
    pub fn new(sift_dir: &Path) -> Result<Self> {
        let config = Config::load(sift_dir)?;
        let store = Arc::new(FileInsightStore::new(sift_dir));

        Ok(Self {
            sift_dir: sift_dir.to_path_buf(),
            config,
            insight_service: InsightService::new(store),
            filter_service: FilterService::new(),
        })
    }

    /// Lookups from the configured path, or empty tables when none is set
    pub fn lookups(&self) -> Result<Lookups> {
        match &self.config.lookups_path {
            Some(path) => Ok(Lookups::load(path)?),
            None => Ok(Lookups::default()),
        }
    }
}
