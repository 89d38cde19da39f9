//! Stamp events.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::user::User;

/// Payload of `STAMP_CREATED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampCreatedEvent {
    /// When the event was dispatched.
    #[serde(with = "time::serde::rfc3339")]
    pub event_time: OffsetDateTime,
    /// Stamp id.
    pub id: Uuid,
    /// Stamp name.
    pub name: String,
    /// Image file id.
    pub file_id: Uuid,
    /// The user who created the stamp.
    pub creator: User,
}
