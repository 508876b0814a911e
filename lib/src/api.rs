//! Elastic Email v2 API definitions.
use serde::Deserialize;
use serde_json::Value;

use crate::Error;

pub const ELASTIC_EMAIL_SEND_URL: &str = "https://api.elasticemail.com/v2/email/send";

// Request timeout, in seconds
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;

/// Headers read from the message to set request flags
pub const POST_BACK_HEADER: &str = "X-Post-Back";
pub const TRANSACTIONAL_HEADER: &str = "X-Transactional";

/// Headers written back onto the message after a successful send
pub const MSG_ID_HEADER: &str = "X-Msg-ID";
pub const JOB_ID_HEADER: &str = "X-Job-ID";

// Reported when a failed response carries no error message
const UNKNOWN_PROVIDER_ERROR: &str = "unknown provider error";

/// Envelope of every Elastic Email API response.
#[derive(Deserialize, Debug)]
pub struct ProviderResponse {
    pub success: bool,
    pub error: Option<String>,
    pub data: Option<Value>,
}

/// Identifiers assigned by the provider to an accepted message
#[derive(Debug, Default, PartialEq)]
pub struct SendResult {
    pub message_id: Option<String>,
    pub transaction_id: Option<String>,
}

impl SendResult {
    fn from_value(value: &Value) -> Self {
        let field = |name: &str| value.get(name).and_then(Value::as_str).map(String::from);

        Self {
            message_id: field("messageid"),
            transaction_id: field("transactionid"),
        }
    }
}

/// Map a raw response body into either the send result or an error.
///
/// A non-empty `data` object is the result. Otherwise identifiers are
/// looked up at the top level of the body.
pub fn parse_response(body: &[u8]) -> Result<SendResult, Error> {
    let raw: Value = serde_json::from_slice(body)?;
    let resp: ProviderResponse = serde_json::from_value(raw.clone())?;

    if !resp.success {
        let msg = resp
            .error
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| UNKNOWN_PROVIDER_ERROR.to_string());
        return Err(Error::Provider(msg));
    }

    match resp.data {
        Some(ref data) if !is_empty(data) => Ok(SendResult::from_value(data)),
        _ => Ok(SendResult::from_value(&raw)),
    }
}

#[inline]
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_object_is_the_result() {
        let body = br#"{"success": true, "data": {"messageid": "m1", "transactionid": "t1"}}"#;
        let result = parse_response(body).unwrap();

        assert_eq!(result.message_id.as_deref(), Some("m1"));
        assert_eq!(result.transaction_id.as_deref(), Some("t1"));
    }

    #[test]
    fn empty_data_falls_back_to_top_level() {
        let body = br#"{"success": true, "data": {}, "messageid": "m2", "transactionid": "t2"}"#;
        let result = parse_response(body).unwrap();

        assert_eq!(result.message_id.as_deref(), Some("m2"));
        assert_eq!(result.transaction_id.as_deref(), Some("t2"));
    }

    #[test]
    fn missing_identifiers_are_none() {
        let result = parse_response(br#"{"success": true}"#).unwrap();
        assert_eq!(result, SendResult::default());
    }

    #[test]
    fn unsuccessful_response_is_provider_error() {
        let body = br#"{"success": false, "error": "Invalid API Key"}"#;
        let err = parse_response(body).unwrap_err();

        assert_eq!(err, Error::Provider("Invalid API Key".to_string()));
    }

    #[test]
    fn unsuccessful_response_without_message() {
        let err = parse_response(br#"{"success": false}"#).unwrap_err();
        assert_eq!(err, Error::Provider("unknown provider error".to_string()));

        let err = parse_response(br#"{"success": false, "error": ""}"#).unwrap_err();
        assert_eq!(err.to_string(), "unknown provider error");
    }

    #[test]
    fn unparseable_body_is_transport_error() {
        let err = parse_response(b"502 Bad Gateway").unwrap_err();
        assert!(err.is_transport());

        // No `success` flag at all
        let err = parse_response(br#"{"data": {}}"#).unwrap_err();
        assert!(err.is_transport());
    }
}
