//! Query wire format — the outbound request body for feature queries.
//!
//! The backend's query endpoint takes a JSON body with three optional
//! narrowing clauses; the HTTP collaborator posts it as-is. Absent clauses
//! are serialized as explicit nulls, which is what the backend expects.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::Expression;

/// A feature query against one table.
///
/// All fields are optional; an empty spec selects every feature and every
/// column. The geometry and column handling happen server-side — this type
/// only carries them across the wire.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QuerySpec {
    /// Property filter, validated client-side.
    pub filter: Option<Expression>,
    /// GeoJSON geometry restricting the query spatially.
    pub aoi: Option<Value>,
    /// Column names to return; `None` returns all columns.
    pub columns: Option<Vec<String>>,
}

impl QuerySpec {
    /// A query with only a property filter.
    #[must_use]
    pub fn filtered(filter: Expression) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }

    /// The JSON request body for the query endpoint.
    #[must_use]
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert(
            "filter".to_string(),
            self.filter.as_ref().map_or(Value::Null, Expression::to_json),
        );
        body.insert(
            "aoi".to_string(),
            self.aoi.clone().unwrap_or(Value::Null),
        );
        body.insert(
            "columns".to_string(),
            match &self.columns {
                Some(columns) => Value::Array(
                    columns.iter().cloned().map(Value::String).collect(),
                ),
                None => Value::Null,
            },
        );
        Value::Object(body)
    }
}
