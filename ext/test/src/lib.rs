//! geovec-test: conformance fixtures for the filter grammar.
//!
//! The filter wire format is shared by every client of the Vector backend,
//! so its grammar tests live as language-neutral YAML fixtures rather than
//! inline assertions. Each fixture names an input expression and the
//! expected outcome: a valid parse (with the round-trip property implied)
//! or an error with a message substring and failing path.
//!
//! # Fixture format
//!
//! ```yaml
//! name: and requires two children
//! expression:
//!   and:
//!     - eq: {a: 1}
//! expect_error: true
//! error_contains: at least 2 entries
//! error_path: /and
//! ```
//!
//! Multiple fixtures per file are separated with `---`.

use serde::Deserialize;

/// One grammar conformance fixture.
#[derive(Debug, Deserialize)]
pub struct ExprFixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// The filter specification under test, in its JSON wire shape.
    pub expression: serde_json::Value,
    /// When true the expression must fail to parse.
    #[serde(default)]
    pub expect_error: bool,
    /// Substring the error message must contain.
    #[serde(default)]
    pub error_contains: Option<String>,
    /// Exact path the error must report.
    #[serde(default)]
    pub error_path: Option<String>,
}

impl ExprFixture {
    /// Parse a single fixture from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators.
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Run this fixture, returning a description of the first mismatch.
    pub fn run(&self) -> Result<(), String> {
        match geovec::Expression::parse(&self.expression) {
            Ok(expr) => {
                if self.expect_error {
                    return Err(format!("expected an error, parsed {expr:?}"));
                }
                let round_trip = expr.to_json();
                if round_trip != self.expression {
                    return Err(format!(
                        "round trip mismatch: {round_trip} != {}",
                        self.expression
                    ));
                }
                Ok(())
            }
            Err(err) => {
                if !self.expect_error {
                    return Err(format!("expected a valid parse, got: {err}"));
                }
                if let Some(needle) = &self.error_contains {
                    if !err.to_string().contains(needle.as_str()) {
                        return Err(format!(
                            "error message missing \"{needle}\": {err}"
                        ));
                    }
                }
                if let Some(path) = &self.error_path {
                    if err.path() != path {
                        return Err(format!(
                            "error path mismatch: expected \"{path}\", got \"{}\"",
                            err.path()
                        ));
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_document_parsing() {
        let yaml = r#"
name: first
expression:
  isnull: geom
---
name: second
expression:
  bogus: {}
expect_error: true
error_contains: Unknown expression operation
"#;
        let fixtures = ExprFixture::from_yaml_multi(yaml).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].name, "first");
        assert!(!fixtures[0].expect_error);
        assert!(fixtures[1].expect_error);
    }

    #[test]
    fn run_catches_unexpected_success() {
        let fixture = ExprFixture::from_yaml(
            "name: x\nexpression:\n  isnull: geom\nexpect_error: true\n",
        )
        .unwrap();
        assert!(fixture.run().is_err());
    }

    #[test]
    fn run_checks_error_path() {
        let fixture = ExprFixture::from_yaml(
            "name: x\nexpression:\n  bogus: {}\nexpect_error: true\nerror_path: /wrong\n",
        )
        .unwrap();
        let err = fixture.run().unwrap_err();
        assert!(err.contains("path mismatch"));
    }
}
