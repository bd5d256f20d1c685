//! Transaction filter engine
//!
//! A filter is a flat list of `(condition, relation)` pairs. It compiles to
//! postfix with AND binding tighter than OR, evaluates against a
//! [`Transaction`](crate::domain::Transaction), renders to text, and
//! round-trips through a JSON document with strict validation.

mod condition;
mod container;
mod document;
mod field;
mod query;

pub use condition::{
    AmountOperator, Condition, ConditionValue, PresenceOperator, TagOperator, TextOperator,
};
pub use container::{ConditionContainer, Relation};
pub use document::{ConditionDocument, ContainerDocument, QueryDocument, Rejection};
pub use field::{Field, Operator};
pub use query::{Query, Token};
