//! The fixed event catalogue.
//!
//! Every event name the platform emits is listed once in `event_catalogue!`
//! together with its wire string, the builder method that overrides its
//! handler and the payload type its body decodes to. The macro expands to:
//!
//! - the [`EventName`] enum with exact, case-sensitive wire lookup,
//! - one typed `on_*` method per name on [`EventRouterBuilder`],
//! - the table of default no-op routes the router starts from.

use std::collections::HashMap;
use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::event::*;
use crate::router::{EventRouterBuilder, IntoHandlerResult, RouteFn, route_fn};

macro_rules! event_catalogue {
    ($(
        $(#[$doc:meta])*
        $variant:ident => $wire:literal, $method:ident($payload:ty);
    )*) => {
        /// A catalogued event name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum EventName {
            $( $(#[$doc])* $variant, )*
        }

        impl EventName {
            /// Every catalogued name, in catalogue order.
            pub const ALL: &'static [EventName] = &[$(EventName::$variant,)*];

            /// Returns the wire string of this name.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(EventName::$variant => $wire,)*
                }
            }

            /// Looks up a wire string. Matching is exact and case-sensitive.
            pub fn from_wire(name: &str) -> Option<Self> {
                match name {
                    $($wire => Some(EventName::$variant),)*
                    _ => None,
                }
            }
        }

        impl EventRouterBuilder {
            $(
                #[doc = concat!("Sets the handler for `", $wire, "`.")]
                pub fn $method<F, Fut, R>(self, handler: F) -> Self
                where
                    F: Fn($payload, CancellationToken) -> Fut + Send + Sync + 'static,
                    Fut: Future<Output = R> + Send + 'static,
                    R: IntoHandlerResult,
                {
                    self.route(EventName::$variant, route_fn::<$payload, _, _, _>(handler))
                }
            )*
        }

        /// One no-op route per catalogued name. Bodies are still decoded.
        pub(crate) fn default_routes() -> HashMap<EventName, RouteFn> {
            let mut routes: HashMap<EventName, RouteFn> = HashMap::with_capacity(EventName::ALL.len());
            $(
                routes.insert(
                    EventName::$variant,
                    route_fn::<$payload, _, _, _>(|_, _| async {}),
                );
            )*
            routes
        }
    };
}

event_catalogue! {
    /// The bot joined a channel.
    Join => "JOIN", on_join(JoinOrLeftEvent);
    /// The bot left a channel.
    Left => "LEFT", on_left(JoinOrLeftEvent);
    /// Connectivity check from the platform.
    Ping => "PING", on_ping(PingEvent);

    /// A message was posted in a channel the bot watches.
    MessageCreated => "MESSAGE_CREATED", on_message_created(MessageCreatedOrUpdatedEvent);
    /// A message was edited.
    MessageUpdated => "MESSAGE_UPDATED", on_message_updated(MessageCreatedOrUpdatedEvent);
    /// A message was deleted.
    MessageDeleted => "MESSAGE_DELETED", on_message_deleted(MessageDeletedEvent);
    /// A direct message was sent to the bot.
    DirectMessageCreated => "DIRECT_MESSAGE_CREATED", on_direct_message_created(MessageCreatedOrUpdatedEvent);
    /// A direct message was edited.
    DirectMessageUpdated => "DIRECT_MESSAGE_UPDATED", on_direct_message_updated(MessageCreatedOrUpdatedEvent);
    /// A direct message was deleted.
    DirectMessageDeleted => "DIRECT_MESSAGE_DELETED", on_direct_message_deleted(DirectMessageDeletedEvent);
    /// Stamps on one of the bot's messages changed.
    BotMessageStampsUpdated => "BOT_MESSAGE_STAMPS_UPDATED", on_bot_message_stamps_updated(BotMessageStampsUpdatedEvent);

    /// A channel was created.
    ChannelCreated => "CHANNEL_CREATED", on_channel_created(ChannelCreatedEvent);
    /// A channel topic changed.
    ChannelTopicChanged => "CHANNEL_TOPIC_CHANGED", on_channel_topic_changed(ChannelTopicChangedEvent);

    /// A user was created.
    UserCreated => "USER_CREATED", on_user_created(UserCreatedOrActivatedEvent);
    /// A user was reactivated.
    UserActivated => "USER_ACTIVATED", on_user_activated(UserCreatedOrActivatedEvent);

    /// A user group was created.
    UserGroupCreated => "USER_GROUP_CREATED", on_user_group_created(UserGroupCreatedEvent);
    /// A user group was updated.
    UserGroupUpdated => "USER_GROUP_UPDATED", on_user_group_updated(UserGroupUpdatedOrDeletedEvent);
    /// A user group was deleted.
    UserGroupDeleted => "USER_GROUP_DELETED", on_user_group_deleted(UserGroupUpdatedOrDeletedEvent);
    /// A member was added to a user group.
    UserGroupMemberAdded => "USER_GROUP_MEMBER_ADDED", on_user_group_member_added(UserGroupMemberEvent);
    /// A group member's role changed.
    UserGroupMemberUpdated => "USER_GROUP_MEMBER_UPDATED", on_user_group_member_updated(UserGroupMemberEvent);
    /// A member was removed from a user group.
    UserGroupMemberRemoved => "USER_GROUP_MEMBER_REMOVED", on_user_group_member_removed(UserGroupMemberEvent);
    /// An admin was added to a user group.
    UserGroupAdminAdded => "USER_GROUP_ADMIN_ADDED", on_user_group_admin_added(UserGroupMemberEvent);
    /// An admin was removed from a user group.
    UserGroupAdminRemoved => "USER_GROUP_ADMIN_REMOVED", on_user_group_admin_removed(UserGroupMemberEvent);

    /// A stamp was created.
    StampCreated => "STAMP_CREATED", on_stamp_created(StampCreatedEvent);

    /// A tag was added to the bot.
    TagAdded => "TAG_ADDED", on_tag_added(TagEvent);
    /// A tag was removed from the bot.
    TagRemoved => "TAG_REMOVED", on_tag_removed(TagEvent);
}

impl EventName {
    /// The platform's error pseudo-event. It carries no request id and has no
    /// handler slot.
    pub const ERROR: &'static str = "ERROR";
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for name in EventName::ALL {
            assert_eq!(EventName::from_wire(name.as_str()), Some(*name));
        }
        assert_eq!(EventName::ALL.len(), 25);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(EventName::from_wire("PING"), Some(EventName::Ping));
        assert_eq!(EventName::from_wire("ping"), None);
        assert_eq!(EventName::from_wire("PING "), None);
    }

    #[test]
    fn test_error_is_not_catalogued() {
        assert_eq!(EventName::from_wire(EventName::ERROR), None);
    }

    #[test]
    fn test_every_name_has_default_route() {
        let routes = default_routes();
        assert!(EventName::ALL.iter().all(|name| routes.contains_key(name)));
    }
}
