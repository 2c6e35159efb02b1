//! Schema-driven parsing of the filter wire format.
//!
//! Every node in the grammar is a mapping with exactly one key: the operator.
//! A single static table ([`SCHEMA`]) maps each operator to the JSON shape
//! its value must have and the constructor that builds the typed node, so
//! validation and construction cannot drift apart per operator.
//!
//! Errors carry a breadcrumb path (`/and[1]/range/size`) accumulated on the
//! way down; the first violation anywhere aborts the whole parse.

use serde_json::{Map, Value};

use crate::{Expression, ParseError, ParseErrorKind, RangeOp, MAX_DEPTH};

// ═══════════════════════════════════════════════════════════════════════════════
// Operator schema
// ═══════════════════════════════════════════════════════════════════════════════

/// The JSON shape an operator's value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueShape {
    /// A JSON array (`and`, `or`).
    List,
    /// A JSON object (`eq`, `ne`, `range`, `prefix`, `like`).
    Mapping,
    /// A bare JSON string (`isnull`, `isnotnull`).
    Text,
}

impl ValueShape {
    fn name(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Mapping => "mapping",
            Self::Text => "string",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Self::List => value.is_array(),
            Self::Mapping => value.is_object(),
            Self::Text => value.is_string(),
        }
    }
}

/// One operator's entry in the schema table.
struct OpSchema {
    operation: &'static str,
    shape: ValueShape,
    build: fn(&Value, &Path, usize) -> Result<Expression, ParseError>,
}

/// The complete grammar: operator name → value shape → constructor.
///
/// Process-wide static configuration; read-only after initialization.
static SCHEMA: &[OpSchema] = &[
    OpSchema {
        operation: "and",
        shape: ValueShape::List,
        build: build_and,
    },
    OpSchema {
        operation: "or",
        shape: ValueShape::List,
        build: build_or,
    },
    OpSchema {
        operation: "eq",
        shape: ValueShape::Mapping,
        build: build_eq,
    },
    OpSchema {
        operation: "ne",
        shape: ValueShape::Mapping,
        build: build_ne,
    },
    OpSchema {
        operation: "range",
        shape: ValueShape::Mapping,
        build: build_range,
    },
    OpSchema {
        operation: "isnull",
        shape: ValueShape::Text,
        build: build_is_null,
    },
    OpSchema {
        operation: "isnotnull",
        shape: ValueShape::Text,
        build: build_is_not_null,
    },
    OpSchema {
        operation: "prefix",
        shape: ValueShape::Mapping,
        build: build_prefix,
    },
    OpSchema {
        operation: "like",
        shape: ValueShape::Mapping,
        build: build_like,
    },
];

fn schema_for(operation: &str) -> Option<&'static OpSchema> {
    SCHEMA.iter().find(|s| s.operation == operation)
}

/// The supported operators and the JSON shape each expects, in grammar order.
pub fn operators() -> impl Iterator<Item = (&'static str, &'static str)> {
    SCHEMA.iter().map(|s| (s.operation, s.shape.name()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Path tracking
// ═══════════════════════════════════════════════════════════════════════════════

/// Breadcrumb into the input tree, used only for error messages.
///
/// Lives for one parse call; each step down allocates a child path so sibling
/// branches never observe each other's segments.
#[derive(Debug, Clone, Default)]
struct Path(String);

impl Path {
    fn root() -> Self {
        Self::default()
    }

    /// Descend into a named segment (`/and`, `/range/size`).
    fn child(&self, segment: &str) -> Self {
        Self(format!("{}/{segment}", self.0))
    }

    /// Descend into a list element (`/and[1]`).
    fn index(&self, idx: usize) -> Self {
        Self(format!("{}[{idx}]", self.0))
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(self.0.clone(), kind)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Parser
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse a filter specification from its JSON encoding.
pub(crate) fn parse(value: &Value) -> Result<Expression, ParseError> {
    parse_at(value, &Path::root(), 1)
}

fn parse_at(value: &Value, path: &Path, depth: usize) -> Result<Expression, ParseError> {
    if depth > MAX_DEPTH {
        return Err(path.error(ParseErrorKind::DepthExceeded {
            depth,
            max: MAX_DEPTH,
        }));
    }

    let node = require_mapping(value, path)?;
    require_exactly(node, 1, path)?;

    // Guarded by the length check above.
    let (operation, value) = node.iter().next().unwrap();

    let path = path.child(operation);
    let Some(schema) = schema_for(operation) else {
        return Err(path.error(ParseErrorKind::UnknownOperation {
            operation: operation.clone(),
        }));
    };

    if !schema.shape.matches(value) {
        return Err(path.error(ParseErrorKind::UnexpectedValueType {
            expected: schema.shape.name(),
            actual: json_type_name(value),
        }));
    }

    (schema.build)(value, &path, depth)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constructors
// ═══════════════════════════════════════════════════════════════════════════════

fn build_and(value: &Value, path: &Path, depth: usize) -> Result<Expression, ParseError> {
    Ok(Expression::And(parse_parts(value, path, depth)?))
}

fn build_or(value: &Value, path: &Path, depth: usize) -> Result<Expression, ParseError> {
    Ok(Expression::Or(parse_parts(value, path, depth)?))
}

/// Parse the children of an `and`/`or`; at least 2 required.
fn parse_parts(value: &Value, path: &Path, depth: usize) -> Result<Vec<Expression>, ParseError> {
    // Shape validated by the dispatcher.
    let items = value.as_array().unwrap();
    if items.len() < 2 {
        return Err(path.error(ParseErrorKind::TooFewEntries {
            min: 2,
            actual: items.len(),
        }));
    }

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| parse_at(item, &path.index(idx), depth + 1))
        .collect()
}

fn build_eq(value: &Value, path: &Path, _depth: usize) -> Result<Expression, ParseError> {
    let (field, value) = field_entry(value, path)?;
    Ok(Expression::Eq {
        field,
        value: value.clone(),
    })
}

fn build_ne(value: &Value, path: &Path, _depth: usize) -> Result<Expression, ParseError> {
    let (field, value) = field_entry(value, path)?;
    Ok(Expression::Ne {
        field,
        value: value.clone(),
    })
}

fn build_prefix(value: &Value, path: &Path, _depth: usize) -> Result<Expression, ParseError> {
    let (field, value) = field_entry(value, path)?;
    Ok(Expression::Prefix {
        field,
        value: value.clone(),
    })
}

fn build_like(value: &Value, path: &Path, _depth: usize) -> Result<Expression, ParseError> {
    let (field, pattern) = field_entry(value, path)?;
    Ok(Expression::Like {
        field,
        pattern: pattern.clone(),
    })
}

fn build_range(value: &Value, path: &Path, _depth: usize) -> Result<Expression, ParseError> {
    let (field, spec) = field_entry(value, path)?;
    let path = path.child(&field);

    let spec = require_mapping(spec, &path)?;
    if spec.is_empty() {
        return Err(path.error(ParseErrorKind::TooFewEntries { min: 1, actual: 0 }));
    }

    let mut bounds = Vec::with_capacity(spec.len());
    for (key, bound) in spec {
        let Some(op) = RangeOp::from_key(key) else {
            return Err(path.error(ParseErrorKind::UnknownRangeOperation {
                operation: key.clone(),
            }));
        };
        bounds.push((op, bound.clone()));
    }

    Ok(Expression::Range { field, bounds })
}

fn build_is_null(value: &Value, _path: &Path, _depth: usize) -> Result<Expression, ParseError> {
    // Shape validated by the dispatcher.
    Ok(Expression::IsNull(value.as_str().unwrap().to_string()))
}

fn build_is_not_null(value: &Value, _path: &Path, _depth: usize) -> Result<Expression, ParseError> {
    // Shape validated by the dispatcher.
    Ok(Expression::IsNotNull(value.as_str().unwrap().to_string()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Validation helpers
// ═══════════════════════════════════════════════════════════════════════════════

fn require_mapping<'v>(value: &'v Value, path: &Path) -> Result<&'v Map<String, Value>, ParseError> {
    value.as_object().ok_or_else(|| {
        path.error(ParseErrorKind::NotAMapping {
            actual: json_type_name(value),
        })
    })
}

fn require_exactly(map: &Map<String, Value>, expected: usize, path: &Path) -> Result<(), ParseError> {
    if map.len() != expected {
        return Err(path.error(ParseErrorKind::WrongEntryCount {
            expected,
            actual: map.len(),
        }));
    }
    Ok(())
}

/// The single `{field: value}` entry of a leaf operator's mapping.
fn field_entry<'v>(value: &'v Value, path: &Path) -> Result<(String, &'v Value), ParseError> {
    // Shape validated by the dispatcher.
    let map = value.as_object().unwrap();
    require_exactly(map, 1, path)?;

    // Guarded by the length check above.
    let (field, value) = map.iter().next().unwrap();
    Ok((field.clone(), value))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
