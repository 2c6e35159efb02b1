//! Expression — the typed filter AST.
//!
//! A filter narrows a table query by property values. The backend evaluates
//! it; this client only validates the tree and moves it across the wire in
//! the nested single-key-mapping JSON shape:
//!
//! ```json
//! { "and": [ {"eq": {"name": "thing"}}, {"range": {"size": {"gte": 3}}} ] }
//! ```
//!
//! Trees are immutable once constructed: [`Expression::parse`] produces a new
//! tree or fails, and [`to_json()`](Expression::to_json) is the exact inverse
//! (round-trip stable).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::ParseError;

/// One comparison bound inside a [`Expression::Range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeOp {
    /// Greater than or equal.
    Gte,
    /// Strictly greater than.
    Gt,
    /// Less than or equal.
    Lte,
    /// Strictly less than.
    Lt,
}

impl RangeOp {
    /// All bound operators, in canonical serialization order.
    pub const ALL: [RangeOp; 4] = [RangeOp::Gte, RangeOp::Gt, RangeOp::Lte, RangeOp::Lt];

    /// The wire-format key for this bound.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gte => "gte",
            Self::Gt => "gt",
            Self::Lte => "lte",
            Self::Lt => "lt",
        }
    }

    /// Parse a wire-format bound key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "gte" => Some(Self::Gte),
            "gt" => Some(Self::Gt),
            "lte" => Some(Self::Lte),
            "lt" => Some(Self::Lt),
            _ => None,
        }
    }
}

impl fmt::Display for RangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated filter expression.
///
/// # Invariants
///
/// [`parse()`](Self::parse) enforces these; programmatic construction through
/// the variants is expected to uphold them too, since the backend rejects
/// trees that violate them:
///
/// - `And` / `Or` have at least 2 children (a single-condition conjunction
///   is meaningless and rejected by the grammar)
/// - `Range` bounds are a non-empty subset of the four [`RangeOp`] keys
/// - Nesting depth does not exceed [`MAX_DEPTH`](crate::MAX_DEPTH)
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// All children must hold.
    And(Vec<Expression>),
    /// Any child must hold.
    Or(Vec<Expression>),
    /// Property equals a literal.
    Eq {
        /// Property name.
        field: String,
        /// Compared literal (any JSON scalar).
        value: Value,
    },
    /// Property does not equal a literal.
    Ne {
        /// Property name.
        field: String,
        /// Compared literal (any JSON scalar).
        value: Value,
    },
    /// Property falls within comparison bounds.
    Range {
        /// Property name.
        field: String,
        /// Bounds in input order; non-empty, keys unique.
        bounds: Vec<(RangeOp, Value)>,
    },
    /// Property is null or absent.
    IsNull(String),
    /// Property is present and non-null.
    IsNotNull(String),
    /// String property starts with a prefix.
    Prefix {
        /// Property name.
        field: String,
        /// The prefix literal.
        value: Value,
    },
    /// String property matches a SQL `LIKE` pattern (evaluated server-side).
    Like {
        /// Property name.
        field: String,
        /// The `LIKE` pattern literal.
        pattern: Value,
    },
}

impl Expression {
    /// Parse and validate a filter specification from its JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] on the first violation anywhere in the tree,
    /// carrying the path of the failing node.
    pub fn parse(value: &Value) -> Result<Self, ParseError> {
        crate::parse::parse(value)
    }

    /// Property-equals leaf.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Property-not-equals leaf.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Ne {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Range leaf over the given bounds.
    pub fn range(field: impl Into<String>, bounds: Vec<(RangeOp, Value)>) -> Self {
        Self::Range {
            field: field.into(),
            bounds,
        }
    }

    /// Null-check leaf.
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::IsNull(field.into())
    }

    /// Non-null-check leaf.
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::IsNotNull(field.into())
    }

    /// String-prefix leaf.
    pub fn prefix(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Prefix {
            field: field.into(),
            value: Value::String(value.into()),
        }
    }

    /// `LIKE`-pattern leaf.
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Like {
            field: field.into(),
            pattern: Value::String(pattern.into()),
        }
    }

    /// Returns `true` if this is a leaf (non-compound) expression.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Self::And(_) | Self::Or(_))
    }

    /// Nesting depth of this expression tree.
    ///
    /// Leaves have depth 1; each `And`/`Or` level adds one.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::And(parts) | Self::Or(parts) => {
                1 + parts.iter().map(Expression::depth).max().unwrap_or(0)
            }
            _ => 1,
        }
    }

    /// Serialize back to the wire format this expression was parsed from.
    ///
    /// Round-trip stable: `Expression::parse(&x)?.to_json() == x` for every
    /// syntactically valid `x`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::And(parts) => wrap("and", Value::Array(children(parts))),
            Self::Or(parts) => wrap("or", Value::Array(children(parts))),
            Self::Eq { field, value } => wrap("eq", entry(field, value.clone())),
            Self::Ne { field, value } => wrap("ne", entry(field, value.clone())),
            Self::Range { field, bounds } => {
                let mut spec = Map::new();
                for (op, bound) in bounds {
                    spec.insert(op.as_str().to_string(), bound.clone());
                }
                wrap("range", entry(field, Value::Object(spec)))
            }
            Self::IsNull(field) => wrap("isnull", Value::String(field.clone())),
            Self::IsNotNull(field) => wrap("isnotnull", Value::String(field.clone())),
            Self::Prefix { field, value } => wrap("prefix", entry(field, value.clone())),
            Self::Like { field, pattern } => wrap("like", entry(field, pattern.clone())),
        }
    }
}

fn wrap(operation: &str, value: Value) -> Value {
    let mut node = Map::new();
    node.insert(operation.to_string(), value);
    Value::Object(node)
}

fn entry(field: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(field.to_string(), value);
    Value::Object(map)
}

fn children(parts: &[Expression]) -> Vec<Value> {
    parts.iter().map(Expression::to_json).collect()
}

impl Serialize for Expression {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Expression {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Expression::parse(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn leaf_constructors_serialize() {
        assert_eq!(
            Expression::eq("name", "thing").to_json(),
            json!({"eq": {"name": "thing"}})
        );
        assert_eq!(
            Expression::ne("count", 3).to_json(),
            json!({"ne": {"count": 3}})
        );
        assert_eq!(
            Expression::is_null("geom").to_json(),
            json!({"isnull": "geom"})
        );
        assert_eq!(
            Expression::is_not_null("geom").to_json(),
            json!({"isnotnull": "geom"})
        );
        assert_eq!(
            Expression::prefix("name", "riv").to_json(),
            json!({"prefix": {"name": "riv"}})
        );
        assert_eq!(
            Expression::like("name", "%creek%").to_json(),
            json!({"like": {"name": "%creek%"}})
        );
    }

    #[test]
    fn range_serializes_in_input_order() {
        let range = Expression::range(
            "size",
            vec![(RangeOp::Gte, json!(3)), (RangeOp::Lt, json!(10))],
        );
        assert_eq!(
            range.to_json(),
            json!({"range": {"size": {"gte": 3, "lt": 10}}})
        );
    }

    #[test]
    fn compound_serializes_children() {
        let expr = Expression::And(vec![
            Expression::eq("a", 1),
            Expression::Or(vec![Expression::eq("b", 2), Expression::is_null("c")]),
        ]);
        assert_eq!(
            expr.to_json(),
            json!({"and": [
                {"eq": {"a": 1}},
                {"or": [{"eq": {"b": 2}}, {"isnull": "c"}]},
            ]})
        );
    }

    #[test]
    fn depth_counts_compound_levels() {
        let leaf = Expression::eq("a", 1);
        assert_eq!(leaf.depth(), 1);
        assert!(leaf.is_leaf());

        let and = Expression::And(vec![Expression::eq("a", 1), Expression::eq("b", 2)]);
        assert_eq!(and.depth(), 2);
        assert!(!and.is_leaf());

        let nested = Expression::Or(vec![and, Expression::eq("c", 3)]);
        assert_eq!(nested.depth(), 3);
    }

    #[test]
    fn range_op_key_round_trip() {
        for op in RangeOp::ALL {
            assert_eq!(RangeOp::from_key(op.as_str()), Some(op));
        }
        assert_eq!(RangeOp::from_key("between"), None);
    }

    #[test]
    fn serde_round_trip() {
        let spec = json!({"and": [
            {"eq": {"a": 1}},
            {"range": {"b": {"gte": 0, "lte": 100}}},
        ]});
        let expr: Expression = serde_json::from_value(spec.clone()).unwrap();
        assert_eq!(serde_json::to_value(&expr).unwrap(), spec);
    }

    #[test]
    fn serde_rejects_invalid() {
        let result: Result<Expression, _> = serde_json::from_value(json!({"bogus": {}}));
        assert!(result.is_err());
    }
}
