//! User group models.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A user's membership in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroupMember {
    /// Group id.
    pub group_id: Uuid,
    /// Member user id.
    pub user_id: Uuid,
}

/// A group member together with their role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroupMemberWithRole {
    /// Group id.
    pub group_id: Uuid,
    /// Member user id.
    pub user_id: Uuid,
    /// Free-form role, may be absent.
    #[serde(default)]
    pub role: Option<String>,
}

/// A user group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroup {
    /// Group id.
    pub id: Uuid,
    /// Group name.
    pub name: String,
    /// Group description.
    pub description: String,
    /// Group type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Icon file id.
    pub icon: Uuid,
    /// Group administrators.
    pub admins: Vec<UserGroupMember>,
    /// Group members.
    pub members: Vec<UserGroupMemberWithRole>,
    /// Creation time.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last update time.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Payload of `USER_GROUP_CREATED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroupCreatedEvent {
    /// When the event was dispatched.
    #[serde(with = "time::serde::rfc3339")]
    pub event_time: OffsetDateTime,
    /// The new group.
    pub group: UserGroup,
}

/// Payload of `USER_GROUP_UPDATED` and `USER_GROUP_DELETED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroupUpdatedOrDeletedEvent {
    /// When the event was dispatched.
    #[serde(with = "time::serde::rfc3339")]
    pub event_time: OffsetDateTime,
    /// The affected group.
    pub group_id: Uuid,
}

/// Payload of the `USER_GROUP_MEMBER_*` and `USER_GROUP_ADMIN_*` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroupMemberEvent {
    /// When the event was dispatched.
    #[serde(with = "time::serde::rfc3339")]
    pub event_time: OffsetDateTime,
    /// The affected membership.
    pub group_member: UserGroupMember,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::fixtures;
    use serde_json::json;

    #[test]
    fn test_decode_group_created() {
        let body = json!({
            "eventTime": fixtures::EVENT_TIME,
            "group": {
                "id": "f265bde2-04cc-4856-9008-3db1d953a539",
                "name": "fugafuga",
                "description": "",
                "type": "",
                "icon": "81f6da0d-3ec1-4b3e-8e4c-e7c8f57e4f25",
                "admins": [{
                    "groupId": "f265bde2-04cc-4856-9008-3db1d953a539",
                    "userId": "b80551a5-2768-4d29-ad78-8e0e92330c8d"
                }],
                "members": [{
                    "groupId": "f265bde2-04cc-4856-9008-3db1d953a539",
                    "userId": "b80551a5-2768-4d29-ad78-8e0e92330c8d",
                    "role": ""
                }],
                "createdAt": "2023-08-25T04:04:32.912312Z",
                "updatedAt": "2023-08-25T04:04:32.912312Z"
            }
        });
        let event: UserGroupCreatedEvent = serde_json::from_value(body).unwrap();
        assert_eq!(event.group.name, "fugafuga");
        assert_eq!(event.group.admins.len(), 1);
        assert_eq!(event.group.members[0].role.as_deref(), Some(""));
    }

    #[test]
    fn test_decode_member_event() {
        let body = json!({
            "eventTime": fixtures::EVENT_TIME,
            "groupMember": {
                "groupId": "f265bde2-04cc-4856-9008-3db1d953a539",
                "userId": "b80551a5-2768-4d29-ad78-8e0e92330c8d"
            }
        });
        let event: UserGroupMemberEvent = serde_json::from_value(body).unwrap();
        assert_eq!(
            event.group_member.group_id.to_string(),
            "f265bde2-04cc-4856-9008-3db1d953a539"
        );
    }
}
