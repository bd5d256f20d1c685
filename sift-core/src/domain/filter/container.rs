//! Relation-tagged condition containers

use std::fmt;

use serde::{Deserialize, Serialize};

use super::condition::Condition;
use super::field::Operator;

/// How a condition joins the expression built so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Marks the head of the expression; never combines
    First,
    And,
    Or,
}

impl Relation {
    /// Binding priority: And binds tighter than Or
    pub fn priority(self) -> u8 {
        match self {
            Relation::First => 0,
            Relation::Or => 1,
            Relation::And => 2,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Relation::First => "first",
            Relation::And => "and",
            Relation::Or => "or",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "first" => Some(Relation::First),
            "and" => Some(Relation::And),
            "or" => Some(Relation::Or),
            _ => None,
        }
    }

    /// Keyword used in rendered expressions
    pub fn keyword(self) -> &'static str {
        match self {
            Relation::First => "",
            Relation::And => "AND",
            Relation::Or => "OR",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A condition paired with the relation joining it to its predecessors
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionContainer {
    pub condition: Condition,
    pub relation: Relation,
}

impl ConditionContainer {
    pub fn new(condition: Condition, relation: Relation) -> Self {
        Self { condition, relation }
    }

    /// Operators the editor may offer for this container's field
    pub fn supported_operators(&self) -> &'static [Operator] {
        self.condition.field().legal_operators()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::AmountOperator;

    #[test]
    fn test_priorities() {
        assert!(Relation::And.priority() > Relation::Or.priority());
        assert!(Relation::Or.priority() > Relation::First.priority());
    }

    #[test]
    fn test_relation_tokens() {
        for relation in [Relation::First, Relation::And, Relation::Or] {
            assert_eq!(Relation::from_token(relation.token()), Some(relation));
            assert_eq!(serde_json::to_value(relation).unwrap(), relation.token());
        }
        assert_eq!(Relation::from_token("xor"), None);
        assert_eq!(Relation::from_token("AND"), None);
    }

    #[test]
    fn test_supported_operators_follow_field() {
        let container = ConditionContainer::new(
            Condition::SourceAmount(AmountOperator::Between, [1, 2]),
            Relation::First,
        );
        assert_eq!(container.supported_operators().len(), 6);
        assert!(container.supported_operators().contains(&Operator::GreaterThan));
    }
}
