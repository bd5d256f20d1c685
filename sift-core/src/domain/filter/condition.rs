//! Condition variants
//!
//! One variant per [`Field`]. Each variant carries an operator type that can
//! only name operators legal for that field, so a condition can never pair a
//! field with an operator it does not support.

use std::collections::HashSet;

use serde_json::Value as JsonValue;

use super::field::{Field, Operator};
use crate::domain::{format_amount, Lookups, Transaction, TransactionType};

/// Declares a closed subset of [`Operator`] with lossless conversions both ways
macro_rules! operator_subset {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl From<$name> for Operator {
            fn from(op: $name) -> Self {
                match op {
                    $($name::$variant => Operator::$variant),+
                }
            }
        }

        impl $name {
            pub fn from_operator(op: Operator) -> Option<Self> {
                match op {
                    $(Operator::$variant => Some($name::$variant),)+
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }
        }
    };
}

operator_subset! {
    /// Comparisons on scaled-integer amounts
    AmountOperator { Equals, NotEquals, GreaterThan, LessThan, Between, NotBetween }
}

operator_subset! {
    /// Presence checks for optional attachments
    PresenceOperator { IsEmpty, IsNotEmpty }
}

operator_subset! {
    TagOperator { IsEmpty, IsNotEmpty, Equals, NotEquals, HasAny, HasAll, NotHasAny, NotHasAll }
}

operator_subset! {
    TextOperator {
        IsEmpty, IsNotEmpty, Equals, NotEquals, Contains, NotContains,
        StartsWith, NotStartsWith, EndsWith, NotEndsWith,
    }
}

impl AmountOperator {
    pub fn is_range(self) -> bool {
        matches!(self, AmountOperator::Between | AmountOperator::NotBetween)
    }

    fn matches(self, amount: i64, [low, high]: [i64; 2]) -> bool {
        match self {
            AmountOperator::Equals => amount == low,
            AmountOperator::NotEquals => amount != low,
            AmountOperator::GreaterThan => amount > low,
            AmountOperator::LessThan => amount < low,
            AmountOperator::Between => low <= amount && amount <= high,
            AmountOperator::NotBetween => !(low <= amount && amount <= high),
        }
    }
}

impl PresenceOperator {
    fn matches(self, is_empty: bool) -> bool {
        match self {
            PresenceOperator::IsEmpty => is_empty,
            PresenceOperator::IsNotEmpty => !is_empty,
        }
    }
}

impl TagOperator {
    fn is_emptiness_check(self) -> bool {
        matches!(self, TagOperator::IsEmpty | TagOperator::IsNotEmpty)
    }

    fn matches(self, actual: &[String], wanted: &[String]) -> bool {
        let actual: HashSet<&str> = actual.iter().map(String::as_str).collect();
        let wanted: HashSet<&str> = wanted.iter().map(String::as_str).collect();
        let has_all = wanted.iter().all(|t| actual.contains(t));
        let has_any = wanted.iter().any(|t| actual.contains(t));
        let equal = actual.len() == wanted.len() && has_all;

        match self {
            TagOperator::IsEmpty => actual.is_empty(),
            TagOperator::IsNotEmpty => !actual.is_empty(),
            TagOperator::Equals => equal,
            TagOperator::NotEquals => !equal,
            TagOperator::HasAny => has_any,
            TagOperator::HasAll => has_all,
            TagOperator::NotHasAny => !has_any,
            TagOperator::NotHasAll => !has_all,
        }
    }
}

impl TextOperator {
    fn is_emptiness_check(self) -> bool {
        matches!(self, TextOperator::IsEmpty | TextOperator::IsNotEmpty)
    }

    fn matches(self, actual: &str, wanted: &str) -> bool {
        match self {
            TextOperator::IsEmpty => actual.is_empty(),
            TextOperator::IsNotEmpty => !actual.is_empty(),
            TextOperator::Equals => actual == wanted,
            TextOperator::NotEquals => actual != wanted,
            TextOperator::Contains => actual.contains(wanted),
            TextOperator::NotContains => !actual.contains(wanted),
            TextOperator::StartsWith => actual.starts_with(wanted),
            TextOperator::NotStartsWith => !actual.starts_with(wanted),
            TextOperator::EndsWith => actual.ends_with(wanted),
            TextOperator::NotEndsWith => !actual.ends_with(wanted),
        }
    }
}

/// Canonical value of a condition as persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionValue {
    Numbers(Vec<i64>),
    Strings(Vec<String>),
    Range([i64; 2]),
    Text(String),
}

impl From<ConditionValue> for JsonValue {
    fn from(value: ConditionValue) -> Self {
        match value {
            ConditionValue::Numbers(numbers) => {
                JsonValue::Array(numbers.into_iter().map(JsonValue::from).collect())
            }
            ConditionValue::Strings(strings) => {
                JsonValue::Array(strings.into_iter().map(JsonValue::String).collect())
            }
            ConditionValue::Range([low, high]) => {
                JsonValue::Array(vec![JsonValue::from(low), JsonValue::from(high)])
            }
            ConditionValue::Text(text) => JsonValue::String(text),
        }
    }
}

/// A single predicate over one transaction field
///
/// Amount and text variants keep whatever the editor last held, even when the
/// operator ignores part of it. [`Condition::value_for_storage`] drops the
/// irrelevant parts, and equality is defined on that projection.
#[derive(Debug, Clone)]
pub enum Condition {
    Type(Vec<TransactionType>),
    Category(Vec<String>),
    SourceAccount(Vec<String>),
    DestinationAccount(Vec<String>),
    SourceAmount(AmountOperator, [i64; 2]),
    DestinationAmount(AmountOperator, [i64; 2]),
    GeoLocation(PresenceOperator),
    Pictures(PresenceOperator),
    Tags(TagOperator, Vec<String>),
    Description(TextOperator, String),
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.field() == other.field()
            && self.operator() == other.operator()
            && self.value_for_storage() == other.value_for_storage()
    }
}

impl Condition {
    pub fn field(&self) -> Field {
        match self {
            Condition::Type(_) => Field::Type,
            Condition::Category(_) => Field::Category,
            Condition::SourceAccount(_) => Field::SourceAccount,
            Condition::DestinationAccount(_) => Field::DestinationAccount,
            Condition::SourceAmount(..) => Field::SourceAmount,
            Condition::DestinationAmount(..) => Field::DestinationAmount,
            Condition::GeoLocation(_) => Field::GeoLocation,
            Condition::Pictures(_) => Field::Pictures,
            Condition::Tags(..) => Field::Tags,
            Condition::Description(..) => Field::Description,
        }
    }

    pub fn operator(&self) -> Operator {
        match self {
            Condition::Type(_)
            | Condition::Category(_)
            | Condition::SourceAccount(_)
            | Condition::DestinationAccount(_) => Operator::In,
            Condition::SourceAmount(op, _) | Condition::DestinationAmount(op, _) => (*op).into(),
            Condition::GeoLocation(op) | Condition::Pictures(op) => (*op).into(),
            Condition::Tags(op, _) => (*op).into(),
            Condition::Description(op, _) => (*op).into(),
        }
    }

    /// A condition for `field` using `operator` with an empty value
    ///
    /// Returns `None` when the operator is not legal for the field.
    pub fn with_operator(field: Field, operator: Operator) -> Option<Self> {
        let condition = match field {
            Field::Type if operator == Operator::In => Condition::Type(Vec::new()),
            Field::Category if operator == Operator::In => Condition::Category(Vec::new()),
            Field::SourceAccount if operator == Operator::In => {
                Condition::SourceAccount(Vec::new())
            }
            Field::DestinationAccount if operator == Operator::In => {
                Condition::DestinationAccount(Vec::new())
            }
            Field::SourceAmount => {
                Condition::SourceAmount(AmountOperator::from_operator(operator)?, [0, 0])
            }
            Field::DestinationAmount => {
                Condition::DestinationAmount(AmountOperator::from_operator(operator)?, [0, 0])
            }
            Field::GeoLocation => {
                Condition::GeoLocation(PresenceOperator::from_operator(operator)?)
            }
            Field::Pictures => Condition::Pictures(PresenceOperator::from_operator(operator)?),
            Field::Tags => Condition::Tags(TagOperator::from_operator(operator)?, Vec::new()),
            Field::Description => {
                Condition::Description(TextOperator::from_operator(operator)?, String::new())
            }
            _ => return None,
        };
        Some(condition)
    }

    /// Evaluate this condition against a transaction
    pub fn matches(&self, tx: &Transaction) -> bool {
        match self {
            Condition::Type(types) => types.contains(&tx.transaction_type),
            Condition::Category(ids) => ids.iter().any(|id| {
                *id == tx.category_id || tx.parent_category_id.as_deref() == Some(id.as_str())
            }),
            Condition::SourceAccount(ids) => ids.contains(&tx.source_account_id),
            Condition::DestinationAccount(ids) => tx
                .destination_account_id
                .as_ref()
                .is_some_and(|id| ids.contains(id)),
            Condition::SourceAmount(op, range) => op.matches(tx.source_amount, *range),
            Condition::DestinationAmount(op, range) => op.matches(tx.destination_amount, *range),
            Condition::GeoLocation(op) => op.matches(tx.geo_location.is_none()),
            Condition::Pictures(op) => op.matches(!tx.has_pictures()),
            Condition::Tags(op, tags) => op.matches(&tx.tag_ids, tags),
            Condition::Description(op, text) => op.matches(&tx.description, text),
        }
    }

    /// Operator-consistent projection of the value, used for persistence and equality
    pub fn value_for_storage(&self) -> ConditionValue {
        match self {
            Condition::Type(types) => {
                ConditionValue::Numbers(types.iter().map(|t| t.code()).collect())
            }
            Condition::Category(ids)
            | Condition::SourceAccount(ids)
            | Condition::DestinationAccount(ids) => ConditionValue::Strings(ids.clone()),
            Condition::SourceAmount(op, [low, high])
            | Condition::DestinationAmount(op, [low, high]) => {
                if op.is_range() {
                    ConditionValue::Range([*low, *high])
                } else {
                    ConditionValue::Range([*low, *low])
                }
            }
            Condition::GeoLocation(_) | Condition::Pictures(_) => {
                ConditionValue::Strings(Vec::new())
            }
            Condition::Tags(op, _) if op.is_emptiness_check() => {
                ConditionValue::Strings(Vec::new())
            }
            Condition::Tags(_, tags) => ConditionValue::Strings(tags.clone()),
            Condition::Description(op, _) if op.is_emptiness_check() => {
                ConditionValue::Text(String::new())
            }
            Condition::Description(_, text) => ConditionValue::Text(text.clone()),
        }
    }

    /// Render this condition as an expression fragment
    pub fn render(&self, lookups: &Lookups) -> String {
        let field = self.field().token();
        let operator = self.operator().symbol();

        match self {
            Condition::Type(types) => {
                let names: Vec<&str> = types.iter().map(|t| t.name()).collect();
                format!("{} {} ({})", field, operator, names.join(", "))
            }
            Condition::Category(ids) => {
                format!("{} {} ({})", field, operator, render_names(ids, |id| lookups.category(id)))
            }
            Condition::SourceAccount(ids) | Condition::DestinationAccount(ids) => {
                format!("{} {} ({})", field, operator, render_names(ids, |id| lookups.account(id)))
            }
            Condition::SourceAmount(op, [low, high])
            | Condition::DestinationAmount(op, [low, high]) => {
                if op.is_range() {
                    let (low, high) = (format_amount(*low), format_amount(*high));
                    format!("{} {} {} AND {}", field, operator, low, high)
                } else {
                    format!("{} {} {}", field, operator, format_amount(*low))
                }
            }
            Condition::GeoLocation(_) | Condition::Pictures(_) => format!("{} {}", field, operator),
            Condition::Tags(op, _) if op.is_emptiness_check() => format!("{} {}", field, operator),
            Condition::Tags(_, tags) => {
                format!("{} {} ({})", field, operator, render_names(tags, |id| lookups.tag(id)))
            }
            Condition::Description(op, _) if op.is_emptiness_check() => {
                format!("{} {}", field, operator)
            }
            Condition::Description(_, text) => format!("{} {} {}", field, operator, quote(text)),
        }
    }

    /// Decode a stored value for a `(field, operator)` pair already known to be legal
    ///
    /// Returns the reason when the value's shape does not fit.
    pub(crate) fn decode(
        field: Field,
        operator: Operator,
        value: &JsonValue,
    ) -> Result<Self, &'static str> {
        let illegal = "operator not legal for field";
        let strings = "expected an array of strings";

        let condition = match field {
            Field::Type => {
                let codes = number_list(value).ok_or("expected an array of integers")?;
                let types = codes
                    .into_iter()
                    .map(TransactionType::from_code)
                    .collect::<Option<Vec<_>>>()
                    .ok_or("unknown transaction type code")?;
                Condition::Type(types)
            }
            Field::Category => Condition::Category(string_list(value).ok_or(strings)?),
            Field::SourceAccount => Condition::SourceAccount(string_list(value).ok_or(strings)?),
            Field::DestinationAccount => {
                Condition::DestinationAccount(string_list(value).ok_or(strings)?)
            }
            Field::SourceAmount | Field::DestinationAmount => {
                let op = AmountOperator::from_operator(operator).ok_or(illegal)?;
                let numbers = number_list(value).ok_or("expected an array of integers")?;
                let range = match (op.is_range(), numbers.as_slice()) {
                    (true, [low, high]) => [*low, *high],
                    (true, _) => return Err("range operator needs exactly two amounts"),
                    (false, [v]) | (false, [v, _]) => [*v, *v],
                    (false, _) => return Err("comparison needs one amount"),
                };
                if field == Field::SourceAmount {
                    Condition::SourceAmount(op, range)
                } else {
                    Condition::DestinationAmount(op, range)
                }
            }
            Field::GeoLocation | Field::Pictures => {
                let op = PresenceOperator::from_operator(operator).ok_or(illegal)?;
                if !value.is_array() {
                    return Err("expected an array");
                }
                if field == Field::GeoLocation {
                    Condition::GeoLocation(op)
                } else {
                    Condition::Pictures(op)
                }
            }
            Field::Tags => {
                let op = TagOperator::from_operator(operator).ok_or(illegal)?;
                if op.is_emptiness_check() {
                    if !value.is_array() {
                        return Err("expected an array");
                    }
                    Condition::Tags(op, Vec::new())
                } else {
                    Condition::Tags(op, string_list(value).ok_or(strings)?)
                }
            }
            Field::Description => {
                let op = TextOperator::from_operator(operator).ok_or(illegal)?;
                let text = value.as_str().ok_or("expected a string")?;
                if op.is_emptiness_check() {
                    Condition::Description(op, String::new())
                } else {
                    Condition::Description(op, text.to_string())
                }
            }
        };

        if condition.operator() != operator {
            return Err(illegal);
        }
        Ok(condition)
    }
}

fn number_list(value: &JsonValue) -> Option<Vec<i64>> {
    value.as_array()?.iter().map(JsonValue::as_i64).collect()
}

fn string_list(value: &JsonValue) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// Quote a string literal, doubling embedded quotes
fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Resolve ids to quoted display names, falling back to the quoted raw id
fn render_names<'a>(ids: &'a [String], lookup: impl Fn(&'a str) -> Option<&'a str>) -> String {
    ids.iter()
        .map(|id| quote(lookup(id).unwrap_or(id)))
        .collect::<Vec<_>>()
        .join(", ")
}
