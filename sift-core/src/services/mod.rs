//! Service layer - business logic orchestration
//!
//! Services coordinate the filter engine with the ports. Each service
//! focuses on a specific use case.

mod filter;
pub mod format;
mod insight;

pub use filter::{FilterResult, FilterService};
pub use format::{detect_amount_format, detect_date_formats, AmountFormat};
pub use insight::{InsightService, InsightSummary};
