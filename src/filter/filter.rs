//! Filter trees and their algebra
//!
//! Trees are immutable values. `and`/`or` are the only ways to build
//! connectives and they always return a normalized tree: nested connectives
//! of the same type are flattened, single children are unwrapped and
//! tautologies/contradictions absorb the whole node.

use std::fmt;

use chrono::Duration;

use super::leaf::LeafFilter;
use super::Kind;
use crate::row::Row;
use crate::user::User;

/// Shape of a filter tree node
#[derive(Clone, Debug)]
pub enum FilterNode {
    /// Single-column predicate
    Leaf(LeafFilter),
    /// Conjunction; empty means always true
    And(Vec<Filter>),
    /// Disjunction; empty means always false
    Or(Vec<Filter>),
}

/// A filter tree tagged with how the caller uses it
#[derive(Clone, Debug)]
pub struct Filter {
    kind: Kind,
    node: FilterNode,
}

impl Filter {
    /// Wraps a leaf predicate
    pub fn leaf(kind: Kind, leaf: LeafFilter) -> Self {
        Self {
            kind,
            node: FilterNode::Leaf(leaf),
        }
    }

    /// The always-true filter (empty conjunction)
    pub fn tautology(kind: Kind) -> Self {
        Self {
            kind,
            node: FilterNode::And(Vec::new()),
        }
    }

    /// The always-false filter (empty disjunction)
    pub fn contradiction(kind: Kind) -> Self {
        Self {
            kind,
            node: FilterNode::Or(Vec::new()),
        }
    }

    /// Builds the normalized conjunction of `filters`
    pub fn and(kind: Kind, filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut conjuncts = Vec::new();
        for filter in filters {
            if filter.is_contradiction() {
                return Self::or(kind, Vec::new());
            }
            conjuncts.extend(filter.into_conjuncts());
        }
        if conjuncts.len() == 1 {
            if let Some(only) = conjuncts.pop() {
                return only;
            }
        }
        Self {
            kind,
            node: FilterNode::And(conjuncts),
        }
    }

    /// Builds the normalized disjunction of `filters`
    pub fn or(kind: Kind, filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut disjuncts = Vec::new();
        for filter in filters {
            if filter.is_tautology() {
                return Self::and(kind, Vec::new());
            }
            disjuncts.extend(filter.into_disjuncts());
        }
        if disjuncts.len() == 1 {
            if let Some(only) = disjuncts.pop() {
                return only;
            }
        }
        Self {
            kind,
            node: FilterNode::Or(disjuncts),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn node(&self) -> &FilterNode {
        &self.node
    }

    /// True only for the empty conjunction
    pub fn is_tautology(&self) -> bool {
        matches!(&self.node, FilterNode::And(children) if children.is_empty())
    }

    /// True only for the empty disjunction
    pub fn is_contradiction(&self) -> bool {
        matches!(&self.node, FilterNode::Or(children) if children.is_empty())
    }

    /// Children of a conjunction, or the filter itself
    pub fn conjuncts(&self) -> Vec<Filter> {
        self.clone().into_conjuncts()
    }

    /// Children of a disjunction, or the filter itself
    pub fn disjuncts(&self) -> Vec<Filter> {
        self.clone().into_disjuncts()
    }

    fn into_conjuncts(self) -> Vec<Filter> {
        match self.node {
            FilterNode::And(children) => children,
            _ => vec![self],
        }
    }

    fn into_disjuncts(self) -> Vec<Filter> {
        match self.node {
            FilterNode::Or(children) => children,
            _ => vec![self],
        }
    }

    /// Evaluates the tree for one row
    pub fn accepts(&self, row: Row<'_>, user: &User, timezone_offset: Duration) -> bool {
        match &self.node {
            FilterNode::Leaf(leaf) => leaf.accepts(row, user, timezone_offset),
            FilterNode::And(children) => children
                .iter()
                .all(|child| child.accepts(row, user, timezone_offset)),
            FilterNode::Or(children) => children
                .iter()
                .any(|child| child.accepts(row, user, timezone_offset)),
        }
    }

    /// Logical complement, pushed down to the leaves
    pub fn negate(&self) -> Self {
        match &self.node {
            FilterNode::Leaf(leaf) => Self::leaf(self.kind, leaf.negate()),
            FilterNode::And(children) => {
                Self::or(self.kind, children.iter().map(Filter::negate))
            }
            FilterNode::Or(children) => {
                Self::and(self.kind, children.iter().map(Filter::negate))
            }
        }
    }

    /// Keeps only the leaves whose column satisfies `predicate`
    ///
    /// Dropped leaves become tautologies, so the result accepts a superset
    /// of what `self` accepts whenever the dropped leaves sit under ANDs.
    pub fn partial_filter(&self, predicate: &dyn Fn(&str) -> bool) -> Self {
        match &self.node {
            FilterNode::Leaf(leaf) => {
                if predicate(leaf.column_name()) {
                    self.clone()
                } else {
                    Self::tautology(self.kind)
                }
            }
            FilterNode::And(children) => Self::and(
                self.kind,
                children.iter().map(|child| child.partial_filter(predicate)),
            ),
            FilterNode::Or(children) => Self::or(
                self.kind,
                children.iter().map(|child| child.partial_filter(predicate)),
            ),
        }
    }

    /// The single value `column` is restricted to equal, if known
    pub fn string_value_restriction_for(&self, column: &str) -> Option<String> {
        match &self.node {
            FilterNode::Leaf(leaf) => leaf.string_value_restriction_for(column),
            FilterNode::And(children) => {
                let mut restriction: Option<String> = None;
                for value in children
                    .iter()
                    .filter_map(|child| child.string_value_restriction_for(column))
                {
                    match &restriction {
                        None => restriction = Some(value),
                        Some(current) if *current == value => {}
                        Some(_) => return None,
                    }
                }
                restriction
            }
            FilterNode::Or(children) => {
                let (first, rest) = children.split_first()?;
                let value = first.string_value_restriction_for(column)?;
                rest.iter()
                    .all(|child| child.string_value_restriction_for(column).as_ref() == Some(&value))
                    .then_some(value)
            }
        }
    }

    /// Lower bound on `column` for every accepted row, if known
    pub fn greatest_lower_bound_for(&self, column: &str, timezone_offset: Duration) -> Option<i64> {
        match &self.node {
            FilterNode::Leaf(leaf) => leaf.greatest_lower_bound_for(column, timezone_offset),
            FilterNode::And(children) => children
                .iter()
                .filter_map(|child| child.greatest_lower_bound_for(column, timezone_offset))
                .max(),
            FilterNode::Or(children) => combine_all(children, i64::min, |child| {
                child.greatest_lower_bound_for(column, timezone_offset)
            }),
        }
    }

    /// Upper bound on `column` for every accepted row, if known
    pub fn least_upper_bound_for(&self, column: &str, timezone_offset: Duration) -> Option<i64> {
        match &self.node {
            FilterNode::Leaf(leaf) => leaf.least_upper_bound_for(column, timezone_offset),
            FilterNode::And(children) => children
                .iter()
                .filter_map(|child| child.least_upper_bound_for(column, timezone_offset))
                .min(),
            FilterNode::Or(children) => combine_all(children, i64::max, |child| {
                child.least_upper_bound_for(column, timezone_offset)
            }),
        }
    }

    /// Bitmask over values `0..32` that every accepted row's `column` lies in, if known
    pub fn value_set_least_upper_bound_for(
        &self,
        column: &str,
        timezone_offset: Duration,
    ) -> Option<u32> {
        match &self.node {
            FilterNode::Leaf(leaf) => {
                leaf.value_set_least_upper_bound_for(column, timezone_offset)
            }
            FilterNode::And(children) => children
                .iter()
                .filter_map(|child| child.value_set_least_upper_bound_for(column, timezone_offset))
                .reduce(|a, b| a & b),
            FilterNode::Or(children) => combine_all(children, |a: u32, b: u32| a | b, |child| {
                child.value_set_least_upper_bound_for(column, timezone_offset)
            }),
        }
    }
}

/// Folds a bound over every child; unknown if any child is unknown or there are none
fn combine_all<V>(
    children: &[Filter],
    combine: impl Fn(V, V) -> V,
    bound: impl Fn(&Filter) -> Option<V>,
) -> Option<V> {
    let mut acc: Option<V> = None;
    for child in children {
        let value = bound(child)?;
        acc = Some(match acc {
            Some(current) => combine(current, value),
            None => value,
        });
    }
    acc
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (children, sep) = match &self.node {
            FilterNode::Leaf(leaf) => return write!(f, "{}", leaf),
            FilterNode::And(children) if children.is_empty() => return write!(f, "TRUE"),
            FilterNode::Or(children) if children.is_empty() => return write!(f, "FALSE"),
            FilterNode::And(children) => (children, " && "),
            FilterNode::Or(children) => (children, " || "),
        };
        write!(f, "(")?;
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", sep)?;
            }
            write!(f, "{}", child)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::filter::RelationalOperator;

    fn state(op: RelationalOperator, operand: &str) -> Filter {
        let get = Arc::new(|row: Row<'_>, _user: &User| row.data::<i64>().copied().unwrap_or(0));
        Filter::leaf(Kind::Row, LeafFilter::int("state", op, operand, get).unwrap())
    }

    fn accepts(filter: &Filter, value: i64) -> bool {
        filter.accepts(Row::new(&value), &User::no_auth(), Duration::zero())
    }

    #[test]
    fn test_and_flattens_nested() {
        let a = state(RelationalOperator::Greater, "0");
        let b = state(RelationalOperator::Less, "5");
        let c = state(RelationalOperator::NotEqual, "3");
        let nested = Filter::and(Kind::Row, [Filter::and(Kind::Row, [a.clone(), b.clone()]), c.clone()]);
        let flat = Filter::and(Kind::Row, [a, b, c]);
        assert_eq!(nested.conjuncts().len(), 3);
        assert_eq!(nested.to_string(), flat.to_string());
    }

    #[test]
    fn test_singleton_is_unwrapped() {
        let a = state(RelationalOperator::Equal, "1");
        let and = Filter::and(Kind::Row, [a.clone()]);
        assert!(matches!(and.node(), FilterNode::Leaf(_)));
        let or = Filter::or(Kind::Row, [a]);
        assert!(matches!(or.node(), FilterNode::Leaf(_)));
    }

    #[test]
    fn test_absorption() {
        let a = state(RelationalOperator::Equal, "1");
        let and = Filter::and(Kind::Row, [a.clone(), Filter::contradiction(Kind::Row)]);
        assert!(and.is_contradiction());
        let or = Filter::or(Kind::Row, [a.clone(), Filter::tautology(Kind::Row)]);
        assert!(or.is_tautology());
        // Neutral elements disappear
        let and = Filter::and(Kind::Row, [a.clone(), Filter::tautology(Kind::Row)]);
        assert!(matches!(and.node(), FilterNode::Leaf(_)));
        let or = Filter::or(Kind::Row, [a, Filter::contradiction(Kind::Row)]);
        assert!(matches!(or.node(), FilterNode::Leaf(_)));
    }

    #[test]
    fn test_empty_connectives() {
        assert!(Filter::and(Kind::Stats, Vec::new()).is_tautology());
        assert!(Filter::or(Kind::Stats, Vec::new()).is_contradiction());
        assert!(Filter::tautology(Kind::Row).negate().is_contradiction());
        assert!(Filter::contradiction(Kind::Row).negate().is_tautology());
        assert_eq!(Filter::tautology(Kind::Row).to_string(), "TRUE");
        assert_eq!(Filter::contradiction(Kind::Row).to_string(), "FALSE");
    }

    #[test]
    fn test_de_morgan() {
        let f = Filter::or(
            Kind::Row,
            [
                Filter::and(
                    Kind::Row,
                    [state(RelationalOperator::GreaterOrEqual, "1"), state(RelationalOperator::LessOrEqual, "2")],
                ),
                state(RelationalOperator::Equal, "7"),
            ],
        );
        let negated = f.negate();
        for value in -2..10 {
            assert_eq!(accepts(&negated, value), !accepts(&f, value), "value {}", value);
        }
        assert!(matches!(negated.node(), FilterNode::And(_)));
    }

    #[test]
    fn test_duality_scenario() {
        let f1 = state(RelationalOperator::Equal, "2");
        let f2 = state(RelationalOperator::Equal, "0");
        assert!(!accepts(&Filter::and(Kind::Row, [f1.clone(), f2.clone()]), 2));
        assert!(accepts(&Filter::or(Kind::Row, [f1, f2]), 2));
    }

    #[test]
    fn test_partial_filter() {
        let get = Arc::new(|_row: Row<'_>, _user: &User| String::new());
        let name = Filter::leaf(
            Kind::Row,
            LeafFilter::string("name", RelationalOperator::Equal, "x", get).unwrap(),
        );
        let f = Filter::and(Kind::Row, [name, state(RelationalOperator::Equal, "1")]);
        let partial = f.partial_filter(&|column| column == "state");
        assert_eq!(partial.to_string(), "state = '1'");
        assert!(f.partial_filter(&|_| false).is_tautology());
    }

    #[test]
    fn test_bounds_combine() {
        let and = Filter::and(
            Kind::Row,
            [state(RelationalOperator::GreaterOrEqual, "1"), state(RelationalOperator::Greater, "3")],
        );
        assert_eq!(and.greatest_lower_bound_for("state", Duration::zero()), Some(4));
        assert_eq!(and.least_upper_bound_for("state", Duration::zero()), None);

        let or = Filter::or(
            Kind::Row,
            [state(RelationalOperator::Equal, "1"), state(RelationalOperator::Equal, "3")],
        );
        assert_eq!(or.greatest_lower_bound_for("state", Duration::zero()), Some(1));
        assert_eq!(or.least_upper_bound_for("state", Duration::zero()), Some(3));
        assert_eq!(or.value_set_least_upper_bound_for("state", Duration::zero()), Some(0b1010));

        let open = Filter::or(
            Kind::Row,
            [state(RelationalOperator::Equal, "1"), state(RelationalOperator::Less, "9")],
        );
        assert_eq!(open.greatest_lower_bound_for("state", Duration::zero()), None);
        assert_eq!(Filter::contradiction(Kind::Row).least_upper_bound_for("state", Duration::zero()), None);
    }

    #[test]
    fn test_string_restriction_combine() {
        let get: crate::filter::ValueAccessor<String> = Arc::new(|_row: Row<'_>, _user: &User| String::new());
        let eq = |value: &str| {
            Filter::leaf(
                Kind::Row,
                LeafFilter::string("host_name", RelationalOperator::Equal, value, get.clone()).unwrap(),
            )
        };
        let and = Filter::and(Kind::Row, [eq("a"), state(RelationalOperator::Equal, "1")]);
        assert_eq!(and.string_value_restriction_for("host_name"), Some("a".to_string()));
        let conflict = Filter::and(Kind::Row, [eq("a"), eq("b")]);
        assert_eq!(conflict.string_value_restriction_for("host_name"), None);
        let agree = Filter::or(Kind::Row, [eq("a"), eq("a")]);
        assert_eq!(agree.string_value_restriction_for("host_name"), Some("a".to_string()));
        let differ = Filter::or(Kind::Row, [eq("a"), eq("b")]);
        assert_eq!(differ.string_value_restriction_for("host_name"), None);
    }
}
