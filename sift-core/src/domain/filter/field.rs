//! Field and operator registry
//!
//! `Field::legal_operators` is the single source of truth for which
//! comparisons a field accepts. The edit UI offers exactly this set and the
//! document parser rejects anything outside it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Transaction attribute inspected by a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Type,
    Category,
    SourceAccount,
    DestinationAccount,
    SourceAmount,
    DestinationAmount,
    GeoLocation,
    Tags,
    Pictures,
    Description,
}

/// Comparison applied to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    In,
    GreaterThan,
    LessThan,
    Equals,
    NotEquals,
    Between,
    NotBetween,
    HasAny,
    HasAll,
    NotHasAny,
    NotHasAll,
    IsEmpty,
    IsNotEmpty,
    Contains,
    NotContains,
    StartsWith,
    NotStartsWith,
    EndsWith,
    NotEndsWith,
}

const MEMBERSHIP_OPERATORS: &[Operator] = &[Operator::In];

const AMOUNT_OPERATORS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::GreaterThan,
    Operator::LessThan,
    Operator::Between,
    Operator::NotBetween,
];

const PRESENCE_OPERATORS: &[Operator] = &[Operator::IsEmpty, Operator::IsNotEmpty];

const TAG_OPERATORS: &[Operator] = &[
    Operator::IsEmpty,
    Operator::IsNotEmpty,
    Operator::Equals,
    Operator::NotEquals,
    Operator::HasAny,
    Operator::HasAll,
    Operator::NotHasAny,
    Operator::NotHasAll,
];

const TEXT_OPERATORS: &[Operator] = &[
    Operator::IsEmpty,
    Operator::IsNotEmpty,
    Operator::Equals,
    Operator::NotEquals,
    Operator::Contains,
    Operator::NotContains,
    Operator::StartsWith,
    Operator::NotStartsWith,
    Operator::EndsWith,
    Operator::NotEndsWith,
];

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Type,
        Field::Category,
        Field::SourceAccount,
        Field::DestinationAccount,
        Field::SourceAmount,
        Field::DestinationAmount,
        Field::GeoLocation,
        Field::Tags,
        Field::Pictures,
        Field::Description,
    ];

    /// Operators this field accepts, in UI order
    pub fn legal_operators(self) -> &'static [Operator] {
        match self {
            Field::Type | Field::Category | Field::SourceAccount | Field::DestinationAccount => {
                MEMBERSHIP_OPERATORS
            }
            Field::SourceAmount | Field::DestinationAmount => AMOUNT_OPERATORS,
            Field::GeoLocation | Field::Pictures => PRESENCE_OPERATORS,
            Field::Tags => TAG_OPERATORS,
            Field::Description => TEXT_OPERATORS,
        }
    }

    pub fn supports(self, operator: Operator) -> bool {
        self.legal_operators().contains(&operator)
    }

    /// Canonical token, used both in stored documents and rendered text
    pub fn token(self) -> &'static str {
        match self {
            Field::Type => "type",
            Field::Category => "category",
            Field::SourceAccount => "source_account",
            Field::DestinationAccount => "destination_account",
            Field::SourceAmount => "source_amount",
            Field::DestinationAmount => "destination_amount",
            Field::GeoLocation => "geo_location",
            Field::Tags => "tags",
            Field::Pictures => "pictures",
            Field::Description => "description",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.token() == token)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl Operator {
    pub const ALL: [Operator; 19] = [
        Operator::In,
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::Equals,
        Operator::NotEquals,
        Operator::Between,
        Operator::NotBetween,
        Operator::HasAny,
        Operator::HasAll,
        Operator::NotHasAny,
        Operator::NotHasAll,
        Operator::IsEmpty,
        Operator::IsNotEmpty,
        Operator::Contains,
        Operator::NotContains,
        Operator::StartsWith,
        Operator::NotStartsWith,
        Operator::EndsWith,
        Operator::NotEndsWith,
    ];

    /// Token used in stored documents
    pub fn token(self) -> &'static str {
        match self {
            Operator::In => "in",
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::Between => "between",
            Operator::NotBetween => "not_between",
            Operator::HasAny => "has_any",
            Operator::HasAll => "has_all",
            Operator::NotHasAny => "not_has_any",
            Operator::NotHasAll => "not_has_all",
            Operator::IsEmpty => "is_empty",
            Operator::IsNotEmpty => "is_not_empty",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::StartsWith => "starts_with",
            Operator::NotStartsWith => "not_starts_with",
            Operator::EndsWith => "ends_with",
            Operator::NotEndsWith => "not_ends_with",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.token() == token)
    }

    /// Symbolic or keyword form used in rendered expressions
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::In => "IN",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::Equals => "=",
            Operator::NotEquals => "!=",
            Operator::Between => "BETWEEN",
            Operator::NotBetween => "NOT BETWEEN",
            Operator::HasAny => "HAS ANY",
            Operator::HasAll => "HAS ALL",
            Operator::NotHasAny => "NOT HAS ANY",
            Operator::NotHasAll => "NOT HAS ALL",
            Operator::IsEmpty => "IS EMPTY",
            Operator::IsNotEmpty => "IS NOT EMPTY",
            Operator::Contains => "CONTAINS",
            Operator::NotContains => "NOT CONTAINS",
            Operator::StartsWith => "STARTS WITH",
            Operator::NotStartsWith => "NOT STARTS WITH",
            Operator::EndsWith => "ENDS WITH",
            Operator::NotEndsWith => "NOT ENDS WITH",
        }
    }

    /// Whether the operator ignores the condition value entirely
    pub fn is_emptiness_check(self) -> bool {
        matches!(self, Operator::IsEmpty | Operator::IsNotEmpty)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
