//! Core domain entities
//!
//! Pure data structures and the filter engine - no I/O beyond loading
//! lookup tables from a path.

pub mod filter;
mod lookups;
pub mod result;
mod transaction;

pub use lookups::Lookups;
pub use transaction::{format_amount, GeoLocation, Transaction, TransactionType};
