//! Response classification — status codes into the client error taxonomy.
//!
//! Classification is derived purely from the status code's hundreds digit;
//! the body is consulted only for an optional `detail` message. The transport
//! collaborator feeds every non-streaming response through
//! [`check_response()`] before the row codec ever sees the body.

use serde_json::Value;

use crate::ServiceError;

/// Status-code class, from the hundreds digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// 2xx — not an error.
    Success,
    /// 3xx — the client was redirected; treated as transient.
    Redirect,
    /// 4xx — the request is invalid; retrying cannot help.
    Client,
    /// 5xx — the server failed; transient.
    Server,
    /// Anything outside 2xx–5xx.
    Unclassified,
}

impl ErrorClass {
    /// Classify a status code by its hundreds digit.
    #[must_use]
    pub fn of(status: u16) -> Self {
        match status / 100 {
            2 => Self::Success,
            3 => Self::Redirect,
            4 => Self::Client,
            5 => Self::Server,
            _ => Self::Unclassified,
        }
    }

    /// Human-readable category label used in error messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Redirect => "redirect",
            Self::Client => "client",
            Self::Server => "server",
            Self::Unclassified => "unknown",
        }
    }
}

/// Check a response's status code, raising a classified error on failure.
///
/// `action` names the operation for the error message (e.g. `"query feature"`).
/// On a non-2xx status the body is probed for a JSON `detail` string; when the
/// body is absent or not JSON the detail clause is simply omitted.
///
/// # Errors
///
/// The [`ServiceError`] variant matching the status class, with a message of
/// the fixed shape `'<action>' failed due to <class> error '<detail>'`.
pub fn check_response(status: u16, body: &[u8], action: &str) -> Result<(), ServiceError> {
    let class = ErrorClass::of(status);
    if class == ErrorClass::Success {
        return Ok(());
    }

    let message = match extract_detail(body) {
        Some(detail) => format!(
            "'{action}' failed due to {} error '{detail}'",
            class.label()
        ),
        None => format!("'{action}' failed due to {} error", class.label()),
    };

    Err(match class {
        ErrorClass::Redirect => ServiceError::Redirect { message },
        ErrorClass::Client => ServiceError::Client { message },
        ErrorClass::Server => ServiceError::Server { message },
        ErrorClass::Unclassified | ErrorClass::Success => ServiceError::Generic { message },
    })
}

/// The `detail` field of a JSON error body, if there is one.
fn extract_detail(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<Value>(body)
        .ok()?
        .get("detail")?
        .as_str()
        .map(str::to_string)
}
