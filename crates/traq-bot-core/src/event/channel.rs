//! Channel models.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::user::User;

/// A channel as embedded in event payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    /// Channel id.
    pub id: Uuid,
    /// Channel name.
    pub name: String,
    /// Full path, e.g. `#general/random`.
    pub path: String,
    /// Parent channel id. The nil UUID for root channels.
    pub parent_id: Uuid,
    /// The user who created the channel.
    pub creator: User,
    /// Creation time.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last update time.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Payload of `CHANNEL_CREATED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelCreatedEvent {
    /// When the event was dispatched.
    #[serde(with = "time::serde::rfc3339")]
    pub event_time: OffsetDateTime,
    /// The new channel.
    pub channel: Channel,
}

/// Payload of `CHANNEL_TOPIC_CHANGED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelTopicChangedEvent {
    /// When the event was dispatched.
    #[serde(with = "time::serde::rfc3339")]
    pub event_time: OffsetDateTime,
    /// The channel whose topic changed.
    pub channel: Channel,
    /// The new topic.
    pub topic: String,
    /// The user who changed the topic.
    #[serde(rename = "updator")]
    pub updater: User,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::fixtures;
    use serde_json::json;

    #[test]
    fn test_decode_topic_changed() {
        let body = json!({
            "eventTime": fixtures::EVENT_TIME,
            "channel": fixtures::channel(),
            "topic": "new topic",
            "updator": fixtures::user(),
        });
        let event: ChannelTopicChangedEvent = serde_json::from_value(body).unwrap();
        assert_eq!(event.topic, "new topic");
        assert_eq!(event.channel.path, "#a/po");
        assert_eq!(event.updater.display_id, "takashi_trap");
    }
}
