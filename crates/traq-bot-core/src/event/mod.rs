//! Event payload models.
//!
//! One argument type per event shape. Several event names share a shape; the
//! mapping lives in [`crate::catalogue`].
//!
//! ```text
//! system   JoinOrLeftEvent, PingEvent
//! message  MessageCreatedOrUpdatedEvent, MessageDeletedEvent,
//!          DirectMessageDeletedEvent, BotMessageStampsUpdatedEvent
//! channel  ChannelCreatedEvent, ChannelTopicChangedEvent
//! user     UserCreatedOrActivatedEvent
//! group    UserGroupCreatedEvent, UserGroupUpdatedOrDeletedEvent, UserGroupMemberEvent
//! stamp    StampCreatedEvent
//! tag      TagEvent
//! ```
//!
//! Ids are UUIDs and timestamps are RFC 3339. Every field is required unless
//! marked otherwise, so a body missing one fails to decode.

pub mod channel;
pub mod group;
pub mod message;
pub mod stamp;
pub mod system;
pub mod tag;
pub mod user;

pub use channel::{Channel, ChannelCreatedEvent, ChannelTopicChangedEvent};
pub use group::{
    UserGroup, UserGroupCreatedEvent, UserGroupMember, UserGroupMemberEvent,
    UserGroupMemberWithRole, UserGroupUpdatedOrDeletedEvent,
};
pub use message::{
    BotMessageStampsUpdatedEvent, DeletedDirectMessage, DeletedMessage, DirectMessageDeletedEvent,
    Embedding, Message, MessageCreatedOrUpdatedEvent, MessageDeletedEvent, MessageStamp,
};
pub use stamp::StampCreatedEvent;
pub use system::{JoinOrLeftEvent, PingEvent};
pub use tag::TagEvent;
pub use user::{User, UserCreatedOrActivatedEvent};

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{Value, json};

    pub const EVENT_TIME: &str = "2019-05-08T13:33:51.690308239Z";

    pub fn user() -> Value {
        json!({
            "id": "dfdff0c9-5de0-46ee-9721-2525e8bb3d45",
            "name": "takashi_trap",
            "displayName": "寺田 健二",
            "displayId": "takashi_trap",
            "iconId": "2bc06cda-bdb9-4a68-8000-62f907f36a92",
            "bot": false
        })
    }

    pub fn channel() -> Value {
        json!({
            "id": "f86c925c-3002-4ba5-939a-c92344e534f9",
            "name": "po",
            "path": "#a/po",
            "parentId": "ea452867-553b-4808-a14f-a47ee0009ee6",
            "creator": user(),
            "createdAt": "2018-04-25T12:22:02Z",
            "updatedAt": "2018-04-25T12:22:02Z"
        })
    }

    pub fn message() -> Value {
        json!({
            "id": "bc9106b3-f9b2-4eca-9ba1-72b39b40954e",
            "user": user(),
            "channelId": "9aba50da-f605-4cd0-a428-5e4558cb911e",
            "text": "!{\"type\": \"user\", \"raw\": \"@takashi_trap\", \"id\": \"dfdff0c9-5de0-46ee-9721-2525e8bb3d45\"} こんにちは",
            "plainText": "@takashi_trap こんにちは",
            "embedded": [
                {
                    "raw": "@takashi_trap",
                    "type": "user",
                    "id": "dfdff0c9-5de0-46ee-9721-2525e8bb3d45"
                }
            ],
            "createdAt": "2019-05-08T13:33:51.632149265Z",
            "updatedAt": "2019-05-08T13:33:51.632149265Z"
        })
    }
}
