//! Response envelope
//!
//! Every endpoint answers HTTP 200 with this JSON envelope; `state` (1/0) and
//! `errorCode` carry the outcome. Clients of the original wire format depend
//! on this shape.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T: Serialize = Value> {
    pub data: Option<T>,
    pub message: String,
    /// 1 = success, 0 = failure.
    pub state: u8,
    pub error_code: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self::build(Some(data), "", 1, "")
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self::build(Some(data), message, 1, "")
    }

    fn build(
        data: Option<T>,
        message: impl Into<String>,
        state: u8,
        error_code: impl Into<String>,
    ) -> Self {
        Self {
            data,
            message: message.into(),
            state,
            error_code: error_code.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

impl Envelope<Value> {
    /// Success carrying only a human-readable message.
    pub fn success_message(message: impl Into<String>) -> Self {
        Self::build(None, message, 1, "")
    }

    pub fn failure(message: impl Into<String>, error_code: impl Into<String>) -> Self {
        Self::build(None, message, 0, error_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_shape() {
        let envelope = Envelope::success(serde_json::json!({ "k": "v" }));
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["state"], 1);
        assert_eq!(json["errorCode"], "");
        assert_eq!(json["data"]["k"], "v");
        assert!(json["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_failure_shape() {
        let envelope = Envelope::failure("boom", "NETWORK_ERROR");
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["state"], 0);
        assert_eq!(json["message"], "boom");
        assert_eq!(json["errorCode"], "NETWORK_ERROR");
        assert_eq!(json["data"], Value::Null);
    }
}
