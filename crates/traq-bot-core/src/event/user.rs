//! User models.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A user as embedded in event payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User id.
    pub id: Uuid,
    /// Login name.
    pub name: String,
    /// Display id.
    pub display_id: String,
    /// Icon file id.
    pub icon_id: Uuid,
    /// Whether the user is a bot.
    pub bot: bool,
}

/// Payload of `USER_CREATED` and `USER_ACTIVATED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreatedOrActivatedEvent {
    /// When the event was dispatched.
    #[serde(with = "time::serde::rfc3339")]
    pub event_time: OffsetDateTime,
    /// The created or activated user.
    pub user: User,
}
