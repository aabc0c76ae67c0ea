//! Response envelopes
//!
//! Every Corral response is wrapped in one of two envelopes carrying the HTTP
//! status alongside the payload or error message.

use serde::{Deserialize, Serialize};

/// Envelope for successful responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessEnvelope<T> {
    #[serde(rename = "Code")]
    pub code: u16,

    #[serde(rename = "Response")]
    pub response: T,
}

impl<T> SuccessEnvelope<T> {
    /// Wrap a payload in a 200 envelope
    pub fn ok(response: T) -> Self {
        Self {
            code: 200,
            response,
        }
    }
}

/// Envelope for failed responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "Code")]
    pub code: u16,

    #[serde(rename = "Error")]
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(code: u16, error: impl Into<String>) -> Self {
        Self {
            code,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_uses_capitalized_keys() {
        let value = serde_json::to_value(SuccessEnvelope::ok("Server ready")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "Code": 200, "Response": "Server ready" })
        );
    }

    #[test]
    fn test_error_envelope_uses_capitalized_keys() {
        let value =
            serde_json::to_value(ErrorEnvelope::new(400, "Missing required parameter: team"))
                .unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "Code": 400, "Error": "Missing required parameter: team" })
        );
    }
}
