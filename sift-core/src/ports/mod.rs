//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces to the engine's external collaborators: where
//! transactions come from and where saved filters are kept. The domain
//! depends only on these traits, not on concrete implementations.

mod insight_store;
mod transaction_source;

pub use insight_store::{InsightStore, StoredInsight};
pub use transaction_source::TransactionSource;
