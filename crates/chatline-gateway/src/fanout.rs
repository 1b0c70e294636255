//! Event delivery to dynamically resolved recipients.
//!
//! Recipients are computed from the channel store and connection registry
//! at the moment of each send, never from a cached subscriber list, so a
//! user removed from a channel stops receiving its events immediately.

use tracing::trace;

use chatline_directory::Directory;
use chatline_types::events::ServerEvent;
use chatline_types::models::{ChannelDetail, ChannelSummary, UserId};

use crate::registry::{ConnId, ConnectionRegistry};
use crate::store::{Channel, ChannelStore};

/// Read-only view over the core tables used to address events.
pub struct Fanout<'a> {
    store: &'a ChannelStore,
    registry: &'a ConnectionRegistry,
    directory: &'a Directory,
}

impl<'a> Fanout<'a> {
    pub fn new(store: &'a ChannelStore, registry: &'a ConnectionRegistry, directory: &'a Directory) -> Self {
        Self {
            store,
            registry,
            directory,
        }
    }

    /// Deliver to the current connection of every participant of a channel.
    /// Unknown channels reach nobody.
    pub fn to_channel(&self, channel_id: &str, event: ServerEvent) -> usize {
        match self.store.get_channel(channel_id) {
            Ok(channel) => self.to_users(channel.participants.iter().copied(), event),
            Err(_) => 0,
        }
    }

    /// Deliver to the current connection of each listed user.
    pub fn to_users<I>(&self, user_ids: I, event: ServerEvent) -> usize
    where
        I: IntoIterator<Item = UserId>,
    {
        let name = event.name();
        let delivered = user_ids
            .into_iter()
            .filter_map(|uid| self.registry.connection_of(uid))
            .filter(|&conn| self.registry.send(conn, event.clone()))
            .count();
        trace!("{} delivered to {} connections", name, delivered);
        delivered
    }

    /// No-op if the user has no bound connection.
    pub fn to_user(&self, user_id: UserId, event: ServerEvent) -> bool {
        self.registry
            .connection_of(user_id)
            .is_some_and(|conn| self.registry.send(conn, event))
    }

    pub fn to_connection(&self, conn_id: ConnId, event: ServerEvent) -> bool {
        self.registry.send(conn_id, event)
    }

    /// Deliver to every open connection, identified or not.
    pub fn global(&self, event: ServerEvent) -> usize {
        self.registry
            .connection_ids()
            .filter(|&conn| self.registry.send(conn, event.clone()))
            .count()
    }

    /// Broadcast the refreshed channel directory to everyone.
    pub fn channels_updated(&self) -> usize {
        self.global(ServerEvent::ChannelsUpdated(self.summaries(None)))
    }

    pub fn participants_updated(&self, channel_id: &str, participants: &[UserId]) -> usize {
        self.to_channel(
            channel_id,
            ServerEvent::ParticipantsUpdated {
                channel_id: channel_id.to_string(),
                participants: self.directory.resolve(participants.iter().copied()),
            },
        )
    }

    pub fn summaries(&self, filter_user_id: Option<UserId>) -> Vec<ChannelSummary> {
        self.store
            .list_channels(filter_user_id)
            .into_iter()
            .map(|ch| self.summary(ch))
            .collect()
    }

    pub fn summary(&self, channel: &Channel) -> ChannelSummary {
        ChannelSummary {
            id: channel.id.clone(),
            name: channel.name.clone(),
            creator_id: channel.creator_id,
            participants: self.directory.resolve(channel.participants.iter().copied()),
        }
    }

    pub fn detail(&self, channel: &Channel) -> ChannelDetail {
        ChannelDetail {
            id: channel.id.clone(),
            name: channel.name.clone(),
            creator_id: channel.creator_id,
            participants: self.directory.resolve(channel.participants.iter().copied()),
            messages: channel.messages.clone(),
        }
    }
}
