//! Message models.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::user::User;

/// An embedded reference inside a message text (mention, channel link, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embedding {
    /// The raw text of the embedding, e.g. `@takashi_trap`.
    pub raw: String,
    /// Embedding kind (`user`, `channel`, `group`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Id of the referenced entity.
    pub id: Uuid,
}

/// A message as embedded in event payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message id.
    pub id: Uuid,
    /// Author.
    pub user: User,
    /// Channel the message was posted in.
    pub channel_id: Uuid,
    /// Raw text including embedding markup.
    pub text: String,
    /// Text with embeddings resolved to plain text.
    pub plain_text: String,
    /// Embeddings found in the text.
    pub embedded: Vec<Embedding>,
    /// Creation time.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last update time.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A deleted channel message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedMessage {
    /// Message id.
    pub id: Uuid,
    /// Channel the message was posted in.
    pub channel_id: Uuid,
}

/// A deleted direct message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedDirectMessage {
    /// Message id.
    pub id: Uuid,
    /// The other party of the conversation.
    pub user_id: Uuid,
    /// Direct message channel id.
    pub channel_id: Uuid,
}

/// A stamp attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageStamp {
    /// Stamp id.
    pub stamp_id: Uuid,
    /// User who attached the stamp.
    pub user_id: Uuid,
    /// How many times the user attached it.
    pub count: u32,
    /// First attach time.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last attach time.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Payload of `MESSAGE_CREATED`, `MESSAGE_UPDATED`, `DIRECT_MESSAGE_CREATED`
/// and `DIRECT_MESSAGE_UPDATED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageCreatedOrUpdatedEvent {
    /// When the event was dispatched.
    #[serde(with = "time::serde::rfc3339")]
    pub event_time: OffsetDateTime,
    /// The message.
    pub message: Message,
}

/// Payload of `MESSAGE_DELETED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDeletedEvent {
    /// When the event was dispatched.
    #[serde(with = "time::serde::rfc3339")]
    pub event_time: OffsetDateTime,
    /// The deleted message.
    pub message: DeletedMessage,
}

/// Payload of `DIRECT_MESSAGE_DELETED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectMessageDeletedEvent {
    /// When the event was dispatched.
    #[serde(with = "time::serde::rfc3339")]
    pub event_time: OffsetDateTime,
    /// The deleted message.
    pub message: DeletedDirectMessage,
}

/// Payload of `BOT_MESSAGE_STAMPS_UPDATED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotMessageStampsUpdatedEvent {
    /// When the event was dispatched.
    #[serde(with = "time::serde::rfc3339")]
    pub event_time: OffsetDateTime,
    /// The bot's message.
    pub message_id: Uuid,
    /// All stamps currently on the message.
    #[serde(default)]
    pub stamps: Vec<MessageStamp>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::fixtures;
    use serde_json::json;

    #[test]
    fn test_decode_message_created() {
        let body = json!({ "eventTime": fixtures::EVENT_TIME, "message": fixtures::message() });
        let event: MessageCreatedOrUpdatedEvent = serde_json::from_value(body).unwrap();
        assert_eq!(event.message.plain_text, "@takashi_trap こんにちは");
        assert_eq!(event.message.embedded.len(), 1);
        assert_eq!(event.message.embedded[0].kind, "user");
        assert_eq!(event.message.user.name, "takashi_trap");
    }

    #[test]
    fn test_decode_message_without_message_fails() {
        let body = json!({ "eventTime": fixtures::EVENT_TIME });
        assert!(serde_json::from_value::<MessageCreatedOrUpdatedEvent>(body).is_err());
    }

    #[test]
    fn test_decode_direct_message_deleted() {
        let body = json!({
            "eventTime": fixtures::EVENT_TIME,
            "message": {
                "id": "bc9106b3-f9b2-4eca-9ba1-72b39b40954e",
                "userId": "dfdff0c9-5de0-46ee-9721-2525e8bb3d45",
                "channelId": "c5a5a697-3bad-4540-b2da-93dc88181d34"
            }
        });
        let event: DirectMessageDeletedEvent = serde_json::from_value(body).unwrap();
        assert_eq!(
            event.message.user_id.to_string(),
            "dfdff0c9-5de0-46ee-9721-2525e8bb3d45"
        );
    }

    #[test]
    fn test_decode_stamps_updated() {
        let body = json!({
            "eventTime": fixtures::EVENT_TIME,
            "messageId": "200b6600-b2cd-4c1e-b366-9c40308cc087",
            "stamps": [{
                "stampId": "1cd58034-8998-4b4c-b96e-1aedf8d2d3f6",
                "userId": "b80551a5-2768-4d29-ad78-8e0e92330c8d",
                "count": 22,
                "createdAt": "2020-10-17T03:35:34.5Z",
                "updatedAt": "2020-10-17T03:35:34.5Z"
            }]
        });
        let event: BotMessageStampsUpdatedEvent = serde_json::from_value(body).unwrap();
        assert_eq!(event.stamps.len(), 1);
        assert_eq!(event.stamps[0].count, 22);
    }
}
