//! geovec - client-side core for the Vector geodata service
//!
//! The Vector backend stores named tables of geometric features and evaluates
//! property filters, spatial queries, joins, and tiling server-side. This
//! crate is exclusively the client's half of that contract:
//!
//! - [`Expression`] — Typed filter-expression AST with JSON (de)serialization
//! - [`parse()`](Expression::parse) — Schema-driven validation of the nested
//!   single-key-mapping filter grammar, with path-qualified errors
//! - [`ErrorClass`] / [`check_response()`] — HTTP status classification into
//!   the client error taxonomy
//! - [`RetryPolicy`] — Exponential backoff with full jitter around any
//!   fallible network operation
//! - [`QuerySpec`] — The outbound query body (`filter` + `aoi` + `columns`)
//!
//! # Key Design Insights
//!
//! 1. **One schema table**: Every operator is described once — expected value
//!    shape plus constructor — and the parser is driven entirely by that
//!    table. There is no per-operator ad hoc validation path.
//!
//! 2. **Parsing is all-or-nothing**: The first violation anywhere in the tree
//!    aborts the whole parse with the deepest path reached. No partially
//!    constructed trees escape.
//!
//! 3. **Retry stays visible**: Network calls are wrapped explicitly via
//!    [`RetryPolicy::run()`] at the call site, never decorated implicitly.
//!
//! # Example
//!
//! ```
//! use geovec::prelude::*;
//! use serde_json::json;
//!
//! let spec = json!({
//!     "and": [
//!         {"eq": {"category": "river"}},
//!         {"range": {"flow_rate": {"gte": 10, "lt": 100}}},
//!     ]
//! });
//!
//! let filter = Expression::parse(&spec)?;
//! assert_eq!(filter.to_json(), spec);
//! # Ok::<(), geovec::ParseError>(())
//! ```
//!
//! The HTTP transport, the columnar row codec, and map rendering are
//! collaborators outside this crate; they consume [`QuerySpec`] bodies and
//! feed status codes and bodies into [`check_response()`].

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod classify;
mod expr;
mod parse;
mod query;
mod retry;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use classify::{check_response, ErrorClass};
pub use expr::{Expression, RangeOp};
pub use parse::operators;
pub use query::QuerySpec;
pub use retry::{RetryPolicy, DEFAULT_MAX_TRIES};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use geovec::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        check_response,
        // Errors
        ErrorClass,
        // Core types
        Expression,
        ParseError,
        ParseErrorKind,
        QuerySpec,
        RangeOp,
        RetryPolicy,
        ServiceError,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum allowed nesting depth for filter expressions.
///
/// Protects the recursive parser against stack overflow from adversarially
/// deep inputs. Enforced at parse time; expressions at exactly this depth
/// are accepted.
pub const MAX_DEPTH: usize = 64;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// The specific violation behind a [`ParseError`].
///
/// Message strings are part of the wire-adjacent contract: other clients of
/// the same backend produce the same wording, so tooling can match on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A node (or a range's bound set) was not a JSON mapping.
    NotAMapping {
        /// JSON type name of what was found instead.
        actual: &'static str,
    },
    /// A mapping did not have the exact required number of entries.
    WrongEntryCount {
        /// Required entry count.
        expected: usize,
        /// Actual entry count.
        actual: usize,
    },
    /// A list or mapping had fewer entries than required.
    TooFewEntries {
        /// Minimum required entry count.
        min: usize,
        /// Actual entry count.
        actual: usize,
    },
    /// The single key at a node is not a known operator.
    UnknownOperation {
        /// The unrecognized operator name.
        operation: String,
    },
    /// An operator's value had the wrong JSON shape.
    UnexpectedValueType {
        /// JSON type name the operator's schema requires.
        expected: &'static str,
        /// JSON type name of what was found.
        actual: &'static str,
    },
    /// A range bound key is not one of `gte`, `gt`, `lte`, `lt`.
    UnknownRangeOperation {
        /// The unrecognized bound key.
        operation: String,
    },
    /// Expression nesting exceeds [`MAX_DEPTH`].
    DepthExceeded {
        /// Depth at which parsing stopped.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAMapping { actual } => {
                write!(f, "Value must be a mapping (was {actual})")
            }
            Self::WrongEntryCount { expected, actual } => {
                write!(
                    f,
                    "Value must have exactly {expected} {} (had {actual})",
                    entries_word(*expected)
                )
            }
            Self::TooFewEntries { min, actual } => {
                write!(
                    f,
                    "Value must have at least {min} {} (had {actual})",
                    entries_word(*min)
                )
            }
            Self::UnknownOperation { operation } => {
                write!(f, "Unknown expression operation: \"{operation}\"")
            }
            Self::UnexpectedValueType { expected, actual } => {
                write!(f, "Expected value of type \"{expected}\", got \"{actual}\"")
            }
            Self::UnknownRangeOperation { operation } => {
                write!(f, "Unknown operation for range expression: \"{operation}\"")
            }
            Self::DepthExceeded { depth, max } => {
                write!(
                    f,
                    "Expression nesting depth is {depth}, but maximum allowed is {max}"
                )
            }
        }
    }
}

fn entries_word(n: usize) -> &'static str {
    if n == 1 {
        "entry"
    } else {
        "entries"
    }
}

/// A malformed or semantically invalid filter specification.
///
/// Carries the breadcrumb path of the failing node (`/and[1]/range`, or
/// `<root>` for the top level) alongside the specific violation. Never
/// retried; always a caller bug or bad input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    path: String,
    kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(path: impl Into<String>, kind: ParseErrorKind) -> Self {
        let mut path = path.into();
        if path.is_empty() {
            path.push_str("<root>");
        }
        Self { path, kind }
    }

    /// The path of the failing node, e.g. `/and[1]/bogus`.
    ///
    /// The top level renders as the literal marker `<root>`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The specific violation.
    #[must_use]
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Parse error: filtering expression at path \"{}\":\n    {}",
            self.path, self.kind
        )
    }
}

impl std::error::Error for ParseError {}

/// Errors surfaced by the service boundary.
///
/// The first four variants are classified purely from an HTTP status code's
/// hundreds digit by [`check_response()`]; `Transport` is reported by the
/// HTTP collaborator for connection-level failures that never produced a
/// status code. Retry eligibility lives in
/// [`RetryPolicy::should_retry()`](RetryPolicy::should_retry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// A 3xx response. Transient; eligible for retry.
    Redirect {
        /// Formatted failure message.
        message: String,
    },
    /// A 4xx response: the request itself is invalid. Never retried.
    Client {
        /// Formatted failure message.
        message: String,
    },
    /// A 5xx response. Transient; eligible for retry.
    Server {
        /// Formatted failure message.
        message: String,
    },
    /// A status code outside the standard classes, or any failure without
    /// enough context to narrow the cause. Not retried.
    Generic {
        /// Formatted failure message.
        message: String,
    },
    /// A connection-level failure from the transport (DNS, TLS, timeout).
    Transport {
        /// Formatted failure message.
        message: String,
    },
}

impl ServiceError {
    /// Wrap a transport-level failure reported by the HTTP collaborator.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// The formatted failure message, regardless of variant.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Redirect { message }
            | Self::Client { message }
            | Self::Server { message }
            | Self::Generic { message }
            | Self::Transport { message } => message,
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ServiceError {}
