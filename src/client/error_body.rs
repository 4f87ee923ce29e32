//! Defensive parsing of 401 error bodies.

use serde_json::Value;

/// Server code for an expired access token.
pub const CODE_TOKEN_EXPIRED: &str = "AUTH_TOKEN_EXPIRED";
/// Server code for a malformed or revoked access token.
pub const CODE_TOKEN_INVALID: &str = "AUTH_TOKEN_INVALID";

/// Outcome of parsing a 401 response body.
///
/// The parse never fails loudly: a body that is not JSON (or not an
/// object) yields [`ErrorBody::Unparseable`], which behaves like a body
/// with no code and no message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    Parsed {
        code: Option<String>,
        message: Option<String>,
    },
    Unparseable,
}

impl ErrorBody {
    /// Parse a raw response body. The backend puts `code`/`message` either
    /// at the top level or nested under an `error` object.
    pub fn parse(raw: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            return Self::Unparseable;
        };
        if !value.is_object() {
            return Self::Unparseable;
        }
        let code = field(&value, "code");
        let message = field(&value, "message");
        Self::Parsed { code, message }
    }

    /// True when the server marked the bearer token as expired or invalid,
    /// which is the trigger for the refresh protocol.
    pub fn indicates_stale_token(&self) -> bool {
        matches!(
            self,
            Self::Parsed { code: Some(code), .. }
                if code == CODE_TOKEN_EXPIRED || code == CODE_TOKEN_INVALID
        )
    }

    /// Server-supplied message, or `default` when none was present.
    pub fn message_or(&self, default: &str) -> String {
        match self {
            Self::Parsed {
                message: Some(message),
                ..
            } => message.clone(),
            _ => default.to_string(),
        }
    }
}

fn field(value: &Value, name: &str) -> Option<String> {
    value
        .get(name)
        .or_else(|| value.get("error").and_then(|e| e.get(name)))
        .and_then(Value::as_str)
        .map(str::to_string)
}
