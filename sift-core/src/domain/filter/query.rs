//! Query: an ordered, relation-tagged condition list
//!
//! Users cannot group conditions explicitly. The flat list is read with the
//! usual boolean precedence (AND before OR) by compiling it to postfix once
//! and walking the postfix stream for both evaluation and rendering.

use tracing::debug;

use super::condition::Condition;
use super::container::{ConditionContainer, Relation};
use super::document::{ConditionDocument, ContainerDocument, QueryDocument, Rejection};
use super::field::{Field, Operator};
use crate::domain::result::{Error, Result};
use crate::domain::{Lookups, Transaction};

/// One element of a compiled query
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'a> {
    Condition(&'a Condition),
    Operator(Relation),
}

/// A saved transaction filter
///
/// The first container always carries [`Relation::First`] and no other does.
/// The editing methods refuse changes that would break this.
#[derive(Debug, PartialEq)]
pub struct Query {
    pub name: String,
    conditions: Vec<ConditionContainer>,
}

impl Query {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            conditions: Vec::new(),
        }
    }

    pub fn conditions(&self) -> &[ConditionContainer] {
        &self.conditions
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    // === Editing ===

    /// Append a condition
    pub fn push(&mut self, condition: Condition, relation: Relation) -> Result<()> {
        check_relation(self.conditions.len(), relation)?;
        self.conditions.push(ConditionContainer::new(condition, relation));
        Ok(())
    }

    /// Builder form of [`Query::push`]
    pub fn with(mut self, condition: Condition, relation: Relation) -> Result<Self> {
        self.push(condition, relation)?;
        Ok(self)
    }

    /// Remove a condition; the next one becomes the head if the head is removed
    pub fn remove(&mut self, index: usize) -> Option<ConditionContainer> {
        if index >= self.conditions.len() {
            return None;
        }
        let removed = self.conditions.remove(index);
        if let Some(head) = self.conditions.first_mut() {
            head.relation = Relation::First;
        }
        Some(removed)
    }

    /// Swap in a new condition, keeping the existing relation
    pub fn replace(&mut self, index: usize, condition: Condition) -> Result<()> {
        let container = self
            .conditions
            .get_mut(index)
            .ok_or_else(|| Error::not_found(format!("condition {}", index)))?;
        container.condition = condition;
        Ok(())
    }

    pub fn set_relation(&mut self, index: usize, relation: Relation) -> Result<()> {
        if index >= self.conditions.len() {
            return Err(Error::not_found(format!("condition {}", index)));
        }
        check_relation(index, relation)?;
        self.conditions[index].relation = relation;
        Ok(())
    }

    /// Reorder a condition
    ///
    /// Whatever lands at position 0 becomes the head; a former head moved
    /// elsewhere joins with AND.
    pub fn move_condition(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.conditions.len();
        if from >= len || to >= len {
            return Err(Error::not_found(format!("condition {}", from.max(to))));
        }
        let container = self.conditions.remove(from);
        self.conditions.insert(to, container);

        for (index, container) in self.conditions.iter_mut().enumerate() {
            if index == 0 {
                container.relation = Relation::First;
            } else if container.relation == Relation::First {
                container.relation = Relation::And;
            }
        }
        Ok(())
    }

    // === Compile / evaluate / render ===

    /// Convert the flat list into postfix order
    ///
    /// Panics if the relation sequence is inconsistent, which can only come
    /// from a bug in the code that built the query.
    pub fn compile(&self) -> Vec<Token<'_>> {
        let mut output = Vec::with_capacity(self.conditions.len() * 2);
        let mut operators: Vec<Relation> = Vec::new();

        let mut containers = self.conditions.iter();
        let Some(head) = containers.next() else {
            return output;
        };
        assert_eq!(
            head.relation,
            Relation::First,
            "query '{}' does not start with a First relation",
            self.name
        );
        output.push(Token::Condition(&head.condition));

        for (offset, container) in containers.enumerate() {
            let relation = container.relation;
            assert_ne!(
                relation,
                Relation::First,
                "query '{}' has a First relation at position {}",
                self.name,
                offset + 1
            );

            while let Some(&top) = operators.last() {
                if top.priority() < relation.priority() {
                    break;
                }
                output.push(Token::Operator(top));
                operators.pop();
            }
            operators.push(relation);
            output.push(Token::Condition(&container.condition));
        }

        while let Some(relation) = operators.pop() {
            output.push(Token::Operator(relation));
        }

        debug!(name = %self.name, tokens = output.len(), "compiled query");
        output
    }

    /// Evaluate the query against a transaction; an empty query matches everything
    pub fn matches(&self, tx: &Transaction) -> bool {
        if self.conditions.is_empty() {
            return true;
        }
        reduce(
            &self.compile(),
            |condition| condition.matches(tx),
            |relation, left, right| match relation {
                Relation::And => left && right,
                Relation::Or => left || right,
                Relation::First => panic!("First relation cannot combine operands"),
            },
        )
    }

    /// Keep only the transactions the query matches
    pub fn filter<'a>(
        &'a self,
        transactions: &'a [Transaction],
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        transactions.iter().filter(move |tx| self.matches(tx))
    }

    /// Render the query as text with minimal parentheses
    ///
    /// A combined operand is wrapped only when it was produced by a
    /// different relation than the one combining it. An empty query renders
    /// as an empty string.
    pub fn render(&self, lookups: &Lookups) -> String {
        if self.conditions.is_empty() {
            return String::new();
        }
        let (text, _) = reduce(
            &self.compile(),
            |condition| (condition.render(lookups), None),
            |relation, left, right| {
                let wrap = |(text, producer): (String, Option<Relation>)| match producer {
                    Some(producer) if producer != relation => format!("({})", text),
                    _ => text,
                };
                let text = format!("{} {} {}", wrap(left), relation.keyword(), wrap(right));
                (text, Some(relation))
            },
        );
        text
    }

    // === Persistence ===

    pub fn to_document(&self) -> QueryDocument {
        QueryDocument {
            name: self.name.clone(),
            conditions: self
                .conditions
                .iter()
                .map(|container| ContainerDocument {
                    condition: ConditionDocument {
                        field: container.condition.field().token().to_string(),
                        operator: container.condition.operator().token().to_string(),
                        value: container.condition.value_for_storage().into(),
                    },
                    relation: container.relation.token().to_string(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_document())?)
    }

    /// Validate a document, reporting the first problem found
    pub fn from_document(document: &QueryDocument) -> std::result::Result<Self, Rejection> {
        let mut conditions = Vec::with_capacity(document.conditions.len());

        for (index, container) in document.conditions.iter().enumerate() {
            let relation = Relation::from_token(&container.relation).ok_or_else(|| {
                Rejection::UnknownRelation {
                    index,
                    relation: container.relation.clone(),
                }
            })?;
            match (index, relation) {
                (0, Relation::First) => {}
                (0, _) => {
                    return Err(Rejection::MissingFirst {
                        relation: container.relation.clone(),
                    })
                }
                (_, Relation::First) => return Err(Rejection::MisplacedFirst { index }),
                _ => {}
            }

            let stored = &container.condition;
            let field = Field::from_token(&stored.field).ok_or_else(|| Rejection::UnknownField {
                index,
                field: stored.field.clone(),
            })?;
            let operator =
                Operator::from_token(&stored.operator).ok_or_else(|| Rejection::UnknownOperator {
                    index,
                    operator: stored.operator.clone(),
                })?;
            if !field.supports(operator) {
                return Err(Rejection::IllegalOperator {
                    index,
                    field,
                    operator,
                });
            }

            let condition = Condition::decode(field, operator, &stored.value).map_err(|reason| {
                Rejection::InvalidValue {
                    index,
                    field,
                    operator,
                    reason,
                }
            })?;
            conditions.push(ConditionContainer::new(condition, relation));
        }

        Ok(Self {
            name: document.name.clone(),
            conditions,
        })
    }

    /// Validate a stored JSON document
    pub fn validate(input: &str) -> std::result::Result<Self, Rejection> {
        let document: QueryDocument =
            serde_json::from_str(input).map_err(|e| Rejection::Malformed(e.to_string()))?;
        Self::from_document(&document)
    }

    /// Parse a stored JSON document, returning `None` if it is not acceptable
    pub fn parse(input: &str) -> Option<Self> {
        match Self::validate(input) {
            Ok(query) => Some(query),
            Err(rejection) => {
                debug!(reason = %rejection, "discarding query document");
                None
            }
        }
    }
}

impl Clone for Query {
    /// Round-trips through the stored document form
    fn clone(&self) -> Self {
        match Self::from_document(&self.to_document()) {
            Ok(query) => query,
            Err(rejection) => panic!(
                "query '{}' does not survive its own document: {}",
                self.name, rejection
            ),
        }
    }
}

/// Reject relations that would put First anywhere but position 0
fn check_relation(index: usize, relation: Relation) -> Result<()> {
    match (index, relation) {
        (0, Relation::First) => Ok(()),
        (0, _) => Err(Error::validation("the first condition must use the 'first' relation")),
        (_, Relation::First) => Err(Error::validation(format!(
            "condition {} cannot use the 'first' relation",
            index
        ))),
        _ => Ok(()),
    }
}

/// Walk a postfix stream with an operand stack
///
/// Panics unless the stream reduces to exactly one value.
fn reduce<T>(
    tokens: &[Token<'_>],
    mut leaf: impl FnMut(&Condition) -> T,
    mut combine: impl FnMut(Relation, T, T) -> T,
) -> T {
    let mut stack: Vec<T> = Vec::with_capacity(tokens.len());

    for token in tokens {
        match *token {
            Token::Condition(condition) => stack.push(leaf(condition)),
            Token::Operator(relation) => {
                let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                    panic!("malformed postfix stream: {} is missing an operand", relation);
                };
                stack.push(combine(relation, left, right));
            }
        }
    }

    let remaining = stack.len();
    match stack.pop() {
        Some(value) if remaining == 1 => value,
        _ => panic!("malformed postfix stream: {} operands left over", remaining),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::{AmountOperator, PresenceOperator, TagOperator, TextOperator};
    use crate::domain::TransactionType;

    fn expense() -> Condition {
        Condition::Type(vec![TransactionType::Expense])
    }

    fn over(amount: i64) -> Condition {
        Condition::SourceAmount(AmountOperator::GreaterThan, [amount, 0])
    }

    fn contains(text: &str) -> Condition {
        Condition::Description(TextOperator::Contains, text.to_string())
    }

    fn record(amount: i64, description: &str) -> Transaction {
        let mut tx = Transaction::new("t", TransactionType::Expense, "c", "a", amount);
        tx.description = description.to_string();
        tx
    }

    fn precedence_query() -> Query {
        Query::new("coffee or big spend")
            .with(expense(), Relation::First)
            .and_then(|q| q.with(over(10000), Relation::And))
            .and_then(|q| q.with(contains("coffee"), Relation::Or))
            .unwrap()
    }

    #[test]
    fn test_precedence_rendering() {
        assert_eq!(
            precedence_query().render(&Lookups::default()),
            "(type IN (Expense) AND source_amount > 100.00) OR description CONTAINS 'coffee'"
        );
    }

    #[test]
    fn test_compile_postfix_order() {
        let query = precedence_query();
        let tokens = query.compile();
        let shape: Vec<String> = tokens
            .iter()
            .map(|t| match t {
                Token::Condition(c) => c.field().token().to_string(),
                Token::Operator(r) => r.keyword().to_string(),
            })
            .collect();
        assert_eq!(shape, vec!["type", "source_amount", "AND", "description", "OR"]);
    }

    #[test]
    fn test_and_binds_tighter_than_later_or() {
        // A OR B AND C  ==  A OR (B AND C)
        let query = Query::new("q")
            .with(contains("coffee"), Relation::First)
            .and_then(|q| q.with(over(10000), Relation::Or))
            .and_then(|q| q.with(Condition::Type(vec![TransactionType::Income]), Relation::And))
            .unwrap();

        assert_eq!(
            query.render(&Lookups::default()),
            "description CONTAINS 'coffee' OR (source_amount > 100.00 AND type IN (Income))"
        );
        // large expense: B true, C false -> false; A false -> false
        assert!(!query.matches(&record(20000, "rent")));
        assert!(query.matches(&record(5, "coffee beans")));
    }

    #[test]
    fn test_same_relation_chains_are_not_wrapped() {
        let query = Query::new("q")
            .with(contains("a"), Relation::First)
            .and_then(|q| q.with(contains("b"), Relation::And))
            .and_then(|q| q.with(contains("c"), Relation::And))
            .unwrap();
        assert_eq!(
            query.render(&Lookups::default()),
            "description CONTAINS 'a' AND description CONTAINS 'b' AND description CONTAINS 'c'"
        );
    }

    #[test]
    fn test_mixed_chain_wraps_only_foreign_groups() {
        // A AND B OR C AND D -> (A AND B) OR (C AND D)
        let query = Query::new("q")
            .with(contains("a"), Relation::First)
            .and_then(|q| q.with(contains("b"), Relation::And))
            .and_then(|q| q.with(contains("c"), Relation::Or))
            .and_then(|q| q.with(contains("d"), Relation::And))
            .unwrap();
        assert_eq!(
            query.render(&Lookups::default()),
            "(description CONTAINS 'a' AND description CONTAINS 'b') OR \
             (description CONTAINS 'c' AND description CONTAINS 'd')"
        );
        assert!(query.matches(&record(0, "c d")));
        assert!(query.matches(&record(0, "a b")));
        assert!(!query.matches(&record(0, "a c")));
    }

    #[test]
    fn test_matches_follows_precedence() {
        let query = precedence_query();
        assert!(query.matches(&record(20000, "rent")));
        assert!(query.matches(&record(100, "coffee")));
        assert!(!query.matches(&record(100, "rent")));

        let mut income = record(20000, "salary");
        income.transaction_type = TransactionType::Income;
        assert!(!query.matches(&income));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let query = Query::new("all");
        assert!(query.matches(&record(0, "")));
        assert!(query.matches(&record(-99999, "anything")));
        assert_eq!(query.render(&Lookups::default()), "");
        assert!(query.compile().is_empty());
    }

    #[test]
    fn test_empty_membership_query_matches_nothing() {
        let query = Query::new("none")
            .with(Condition::Category(vec![]), Relation::First)
            .unwrap();
        assert!(!query.matches(&record(0, "")));
        assert!(!query.matches(&record(500, "coffee")));
    }

    #[test]
    fn test_filter() {
        let query = Query::new("coffee")
            .with(contains("coffee"), Relation::First)
            .unwrap();
        let records = vec![record(1, "coffee"), record(2, "tea"), record(3, "iced coffee")];
        let ids: Vec<i64> = query.filter(&records).map(|t| t.source_amount).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_push_enforces_first_relation() {
        let mut query = Query::new("q");
        assert!(query.push(expense(), Relation::And).is_err());
        query.push(expense(), Relation::First).unwrap();
        assert!(query.push(over(1), Relation::First).is_err());
        query.push(over(1), Relation::Or).unwrap();
        assert!(query.set_relation(0, Relation::And).is_err());
        assert!(query.set_relation(1, Relation::First).is_err());
        query.set_relation(1, Relation::And).unwrap();
        assert_eq!(query.conditions()[1].relation, Relation::And);
    }

    #[test]
    fn test_remove_promotes_new_head() {
        let mut query = precedence_query();
        let removed = query.remove(0).unwrap();
        assert_eq!(removed.relation, Relation::First);
        assert_eq!(query.len(), 2);
        assert_eq!(query.conditions()[0].relation, Relation::First);
        assert_eq!(query.conditions()[1].relation, Relation::Or);
        assert!(query.remove(5).is_none());
    }

    #[test]
    fn test_move_condition_renormalizes_relations() {
        let mut query = precedence_query();
        query.move_condition(2, 0).unwrap();
        let relations: Vec<Relation> = query.conditions().iter().map(|c| c.relation).collect();
        assert_eq!(relations, vec![Relation::First, Relation::And, Relation::And]);
        assert_eq!(query.conditions()[0].condition.field(), Field::Description);
        assert!(query.move_condition(0, 3).is_err());
    }

    #[test]
    fn test_replace_keeps_relation() {
        let mut query = precedence_query();
        query.replace(1, Condition::Pictures(PresenceOperator::IsEmpty)).unwrap();
        assert_eq!(query.conditions()[1].relation, Relation::And);
        assert_eq!(query.conditions()[1].condition.field(), Field::Pictures);
        assert!(query.replace(3, expense()).is_err());
    }

    #[test]
    fn test_document_roundtrip() {
        let conditions = [
            (
                Condition::Type(vec![TransactionType::Expense, TransactionType::Transfer]),
                Relation::First,
            ),
            (Condition::Category(vec!["c1".into()]), Relation::And),
            (Condition::SourceAccount(vec!["a1".into()]), Relation::Or),
            (Condition::DestinationAccount(vec!["a2".into()]), Relation::And),
            (Condition::SourceAmount(AmountOperator::Between, [-500, 500]), Relation::And),
            (Condition::DestinationAmount(AmountOperator::Equals, [7, 99]), Relation::Or),
            (Condition::GeoLocation(PresenceOperator::IsNotEmpty), Relation::And),
            (Condition::Pictures(PresenceOperator::IsEmpty), Relation::And),
            (Condition::Tags(TagOperator::NotHasAll, vec!["t1".into()]), Relation::Or),
            (Condition::Description(TextOperator::EndsWith, "it's".into()), Relation::And),
        ];
        let mut query = Query::new("everything");
        for (condition, relation) in conditions {
            query.push(condition, relation).unwrap();
        }

        let json = query.to_json().unwrap();
        let parsed = Query::parse(&json).unwrap();
        assert_eq!(parsed, query);
        assert_eq!(parsed.to_document(), query.to_document());
    }

    #[test]
    fn test_document_shape() {
        let query = Query::new("big")
            .with(Condition::SourceAmount(AmountOperator::Equals, [500, 999]), Relation::First)
            .and_then(|q| {
                q.with(Condition::Tags(TagOperator::IsEmpty, vec!["stale".into()]), Relation::Or)
            })
            .unwrap();
        let value = serde_json::to_value(query.to_document()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": "big",
                "conditions": [
                    {"condition": {"field": "source_amount", "operator": "equals", "value": [500, 500]}, "relation": "first"},
                    {"condition": {"field": "tags", "operator": "is_empty", "value": []}, "relation": "or"}
                ]
            })
        );
    }

    #[test]
    fn test_clone_roundtrips() {
        let query = precedence_query();
        let copy = query.clone();
        assert_eq!(copy, query);
        assert_eq!(copy.render(&Lookups::default()), query.render(&Lookups::default()));
    }

    #[test]
    fn test_parse_rejections() {
        let cases = [
            "{}",
            "not json",
            r#"{"name": "x"}"#,
            r#"{"name": "x", "conditions": [{"condition": {"field": "type", "operator": "in", "value": [3]}, "relation": "and"}]}"#,
            r#"{"name": "x", "conditions": [
                {"condition": {"field": "type", "operator": "in", "value": [3]}, "relation": "first"},
                {"condition": {"field": "type", "operator": "in", "value": [2]}, "relation": "first"}]}"#,
            r#"{"name": "x", "conditions": [{"condition": {"field": "type", "operator": "in", "value": [3]}, "relation": "xor"}]}"#,
            r#"{"name": "x", "conditions": [{"condition": {"field": "source_amount", "operator": "contains", "value": [1, 2]}, "relation": "first"}]}"#,
            r#"{"name": "x", "conditions": [{"condition": {"field": "source_amount", "operator": "between", "value": [1]}, "relation": "first"}]}"#,
            r#"{"name": "x", "conditions": [{"condition": {"field": "merchant", "operator": "in", "value": []}, "relation": "first"}]}"#,
            r#"{"name": "x", "conditions": [{"condition": {"field": "type", "operator": "matches", "value": []}, "relation": "first"}]}"#,
            r#"{"name": "x", "conditions": [{"condition": {"field": "description", "operator": "contains", "value": 5}, "relation": "first"}]}"#,
        ];
        for case in cases {
            assert!(Query::parse(case).is_none(), "accepted: {}", case);
        }
    }

    #[test]
    fn test_rejection_reasons() {
        let illegal = r#"{"name": "x", "conditions": [{"condition": {"field": "source_amount", "operator": "contains", "value": [1, 2]}, "relation": "first"}]}"#;
        assert_eq!(
            Query::validate(illegal).unwrap_err(),
            Rejection::IllegalOperator {
                index: 0,
                field: Field::SourceAmount,
                operator: Operator::Contains
            }
        );

        let misplaced = r#"{"name": "x", "conditions": [
            {"condition": {"field": "pictures", "operator": "is_empty", "value": []}, "relation": "first"},
            {"condition": {"field": "pictures", "operator": "is_empty", "value": []}, "relation": "first"}]}"#;
        assert_eq!(Query::validate(misplaced).unwrap_err(), Rejection::MisplacedFirst { index: 1 });
    }

    #[test]
    fn test_parse_accepts_empty_conditions() {
        let query = Query::parse(r#"{"name": "all", "conditions": []}"#).unwrap();
        assert!(query.is_empty());
        assert_eq!(query.name, "all");
    }

    #[test]
    #[should_panic(expected = "malformed postfix stream")]
    fn test_reduce_rejects_dangling_operator() {
        let condition = expense();
        let tokens = [Token::Condition(&condition), Token::Operator(Relation::And)];
        reduce(&tokens, |_| true, |_, l, r| l && r);
    }

    #[test]
    #[should_panic(expected = "malformed postfix stream")]
    fn test_reduce_rejects_leftover_operands() {
        let condition = expense();
        let tokens = [Token::Condition(&condition), Token::Condition(&condition)];
        reduce(&tokens, |_| true, |_, l, r| l && r);
    }
}
