//! Persisted form of a query and the reasons a stored document can be rejected

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::field::{Field, Operator};

/// Stored query: `{ name, conditions: [{ condition: { field, operator, value }, relation }] }`
///
/// Tokens are kept as plain strings so that documents written by a newer
/// version still deserialize far enough to be rejected with a precise reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDocument {
    pub name: String,
    pub conditions: Vec<ContainerDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerDocument {
    pub condition: ConditionDocument,
    pub relation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionDocument {
    pub field: String,
    pub operator: String,
    pub value: JsonValue,
}

/// Why a stored document could not be turned into a query
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("condition {index}: unknown relation '{relation}'")]
    UnknownRelation { index: usize, relation: String },

    #[error("condition 0: expected relation 'first', found '{relation}'")]
    MissingFirst { relation: String },

    #[error("condition {index}: relation 'first' is only allowed on the first condition")]
    MisplacedFirst { index: usize },

    #[error("condition {index}: unknown field '{field}'")]
    UnknownField { index: usize, field: String },

    #[error("condition {index}: unknown operator '{operator}'")]
    UnknownOperator { index: usize, operator: String },

    #[error(
        "condition {index}: operator '{}' is not supported by field '{}'",
        .operator.token(),
        .field.token()
    )]
    IllegalOperator {
        index: usize,
        field: Field,
        operator: Operator,
    },

    #[error(
        "condition {index}: invalid value for {} {}: {reason}",
        .field.token(),
        .operator.token()
    )]
    InvalidValue {
        index: usize,
        field: Field,
        operator: Operator,
        reason: &'static str,
    },
}
