//! Connection lifecycle events.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::channel::Channel;

/// Payload of `PING`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingEvent {
    /// When the event was dispatched.
    #[serde(with = "time::serde::rfc3339")]
    pub event_time: OffsetDateTime,
}

/// Payload of `JOIN` and `LEFT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinOrLeftEvent {
    /// When the event was dispatched.
    #[serde(with = "time::serde::rfc3339")]
    pub event_time: OffsetDateTime,
    /// The channel the bot joined or left.
    pub channel: Channel,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::fixtures;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn test_decode_ping() {
        let event: PingEvent =
            serde_json::from_value(json!({ "eventTime": fixtures::EVENT_TIME })).unwrap();
        assert_eq!(
            event.event_time,
            datetime!(2019-05-08 13:33:51.690308239 UTC)
        );
    }

    #[test]
    fn test_decode_ping_rejects_null() {
        assert!(serde_json::from_value::<PingEvent>(serde_json::Value::Null).is_err());
        assert!(serde_json::from_value::<PingEvent>(json!({})).is_err());
    }

    #[test]
    fn test_decode_join() {
        let body = json!({ "eventTime": fixtures::EVENT_TIME, "channel": fixtures::channel() });
        let event: JoinOrLeftEvent = serde_json::from_value(body).unwrap();
        assert_eq!(event.channel.name, "po");
    }
}
