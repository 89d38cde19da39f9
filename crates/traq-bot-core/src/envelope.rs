//! The normalized unit of one platform event.

use serde::Deserialize;
use serde_json::Value;

use crate::catalogue::EventName;
use crate::error::{TransportError, TransportResult};

/// One platform event as delivered by a transport.
///
/// Envelopes are created at the transport boundary and consumed exactly once
/// by the dispatch loop. The body stays opaque until the router decodes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    event_name: String,
    request_id: Option<String>,
    body: Value,
}

impl Envelope {
    /// Creates a new envelope.
    pub fn new(event_name: impl Into<String>, request_id: Option<String>, body: Value) -> Self {
        Self {
            event_name: event_name.into(),
            request_id,
            body,
        }
    }

    /// Parses a socket text frame of the form `{"type", "reqId", "body"}`.
    ///
    /// `type` and `body` are required. `reqId` is taken when present; `ERROR`
    /// frames never carry one.
    pub fn from_frame(text: &str) -> TransportResult<Self> {
        let frame: WireEnvelope =
            serde_json::from_str(text).map_err(|e| TransportError::malformed(e.to_string()))?;

        if frame.event_name.is_empty() {
            return Err(TransportError::malformed("empty event type"));
        }

        let request_id = if frame.event_name == EventName::ERROR {
            None
        } else {
            frame.request_id
        };

        Ok(Self {
            event_name: frame.event_name,
            request_id,
            body: frame.body,
        })
    }

    /// Returns the event name.
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// Returns the request id, absent for `ERROR` events.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Returns the undecoded body.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Splits the envelope into its parts.
    pub fn into_parts(self) -> (String, Option<String>, Value) {
        (self.event_name, self.request_id, self.body)
    }
}

#[derive(Deserialize)]
struct WireEnvelope {
    #[serde(rename = "type")]
    event_name: String,
    #[serde(rename = "reqId", default)]
    request_id: Option<String>,
    body: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_frame_with_request_id() {
        let env = Envelope::from_frame(r#"{"type":"JOIN","reqId":"r1","body":{"a":1}}"#).unwrap();
        assert_eq!(env.event_name(), "JOIN");
        assert_eq!(env.request_id(), Some("r1"));
        assert_eq!(env.body(), &json!({"a": 1}));
    }

    #[test]
    fn test_error_frame_has_no_request_id() {
        let env = Envelope::from_frame(r#"{"type":"ERROR","body":"bad request"}"#).unwrap();
        assert_eq!(env.event_name(), "ERROR");
        assert_eq!(env.request_id(), None);
    }

    #[test]
    fn test_error_frame_ignores_request_id() {
        let env = Envelope::from_frame(r#"{"type":"ERROR","reqId":"x","body":null}"#).unwrap();
        assert_eq!(env.request_id(), None);
    }

    #[test]
    fn test_missing_request_id_is_absent() {
        let env = Envelope::from_frame(r#"{"type":"PING","body":{}}"#).unwrap();
        assert_eq!(env.event_name(), "PING");
        assert_eq!(env.request_id(), None);
    }

    #[test]
    fn test_missing_body_is_malformed() {
        let err = Envelope::from_frame(r#"{"type":"PING","reqId":"r"}"#).unwrap_err();
        assert!(matches!(err, TransportError::MalformedFrame { .. }));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        assert!(Envelope::from_frame("not json").is_err());
        assert!(Envelope::from_frame(r#"{"type":"","reqId":"r","body":{}}"#).is_err());
    }
}
