use std::collections::{BTreeSet, HashMap};

use tracing::info;
use uuid::Uuid;

use chatline_types::models::{ChannelId, Message, UserId};

use crate::error::GatewayError;

/// A live channel. Owned exclusively by [`ChannelStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    pub creator_id: UserId,
    pub participants: BTreeSet<UserId>,
    pub messages: Vec<Message>,
}

impl Channel {
    /// Participant ids in ascending order.
    pub fn participant_ids(&self) -> Vec<UserId> {
        self.participants.iter().copied().collect()
    }
}

/// Participant snapshot after a join or kick. `changed` is false when the
/// operation was an idempotent no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub participants: Vec<UserId>,
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Channel or membership was already absent.
    Unchanged,
    /// The user left. `new_creator` is set when the creator left and
    /// creatorship moved to the lowest remaining participant id.
    Left {
        participants: Vec<UserId>,
        new_creator: Option<UserId>,
    },
    /// The creator was the last participant; the channel no longer exists.
    Dissolved(Channel),
}

/// Authoritative table of channels, listed in creation order.
#[derive(Debug, Default)]
pub struct ChannelStore {
    channels: HashMap<ChannelId, Channel>,
    order: Vec<ChannelId>,
}

impl ChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn create_channel(&mut self, name: &str, creator_id: UserId) -> Result<&Channel, GatewayError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GatewayError::Validation("Channel name must not be empty"));
        }

        // v4 ids stay distinct even when many channels are created in the same instant
        let id = format!("chan_{}", Uuid::new_v4().simple());
        let channel = Channel {
            id: id.clone(),
            name: name.to_string(),
            creator_id,
            participants: BTreeSet::from([creator_id]),
            messages: Vec::new(),
        };

        info!("Channel {} ({}) created by {}", id, name, creator_id);
        self.order.push(id.clone());
        Ok(self.channels.entry(id).or_insert(channel))
    }

    pub fn get_channel(&self, id: &str) -> Result<&Channel, GatewayError> {
        self.channels.get(id).ok_or_else(GatewayError::channel_not_found)
    }

    /// Channels in creation order, optionally only those `user_id` belongs to.
    pub fn list_channels(&self, filter_user_id: Option<UserId>) -> Vec<&Channel> {
        self.order
            .iter()
            .filter_map(|id| self.channels.get(id))
            .filter(|ch| filter_user_id.is_none_or(|uid| ch.participants.contains(&uid)))
            .collect()
    }

    pub fn join_channel(&mut self, id: &str, user_id: UserId) -> Result<Membership, GatewayError> {
        let channel = self.channel_mut(id)?;
        let changed = channel.participants.insert(user_id);
        Ok(Membership {
            participants: channel.participant_ids(),
            changed,
        })
    }

    pub fn leave_channel(&mut self, id: &str, user_id: UserId) -> LeaveOutcome {
        let Some(channel) = self.channels.get_mut(id) else {
            return LeaveOutcome::Unchanged;
        };
        if !channel.participants.remove(&user_id) {
            return LeaveOutcome::Unchanged;
        }

        let mut new_creator = None;
        if channel.creator_id == user_id {
            match channel.participants.first().copied() {
                Some(successor) => {
                    info!("Channel {} creatorship moved from {} to {}", id, user_id, successor);
                    channel.creator_id = successor;
                    new_creator = Some(successor);
                }
                None => {
                    info!("Channel {} dissolved after its creator {} left", id, user_id);
                    return match self.remove(id) {
                        Some(channel) => LeaveOutcome::Dissolved(channel),
                        None => LeaveOutcome::Unchanged,
                    };
                }
            }
        }

        LeaveOutcome::Left {
            participants: channel.participant_ids(),
            new_creator,
        }
    }

    /// Only the creator may delete. Returns the removed channel.
    pub fn delete_channel(&mut self, id: &str, requester_id: UserId) -> Result<Channel, GatewayError> {
        if self.get_channel(id)?.creator_id != requester_id {
            return Err(GatewayError::no_permission());
        }
        info!("Channel {} deleted by {}", id, requester_id);
        self.remove(id).ok_or_else(GatewayError::channel_not_found)
    }

    /// Only the creator may kick, and the creator cannot be kicked.
    pub fn kick(
        &mut self,
        id: &str,
        target_id: UserId,
        requester_id: UserId,
    ) -> Result<Membership, GatewayError> {
        let channel = self.channel_mut(id)?;
        if channel.creator_id != requester_id {
            return Err(GatewayError::no_permission());
        }
        if target_id == channel.creator_id {
            return Err(GatewayError::Validation("Creator cannot be kicked"));
        }

        let changed = channel.participants.remove(&target_id);
        if changed {
            info!("User {} kicked from {} by {}", target_id, id, requester_id);
        }
        Ok(Membership {
            participants: channel.participant_ids(),
            changed,
        })
    }

    /// Appends a message stamped with the server clock. Timestamps never go
    /// backwards within a channel.
    pub fn post_message(&mut self, id: &str, sender_id: UserId, text: &str) -> Result<Message, GatewayError> {
        if text.trim().is_empty() {
            return Err(GatewayError::Validation("Message text must not be empty"));
        }
        let channel = self.channel_mut(id)?;

        let now = chrono::Utc::now().timestamp_millis();
        let timestamp = channel
            .messages
            .last()
            .map_or(now, |last| now.max(last.timestamp));

        let message = Message {
            id: Uuid::new_v4().to_string(),
            channel_id: channel.id.clone(),
            sender_id,
            text: text.to_string(),
            timestamp,
        };
        channel.messages.push(message.clone());
        Ok(message)
    }

    /// Ids of every channel `user_id` participates in, in creation order.
    pub fn channels_of(&self, user_id: UserId) -> Vec<ChannelId> {
        self.list_channels(Some(user_id))
            .into_iter()
            .map(|ch| ch.id.clone())
            .collect()
    }

    fn channel_mut(&mut self, id: &str) -> Result<&mut Channel, GatewayError> {
        self.channels.get_mut(id).ok_or_else(GatewayError::channel_not_found)
    }

    fn remove(&mut self, id: &str) -> Option<Channel> {
        self.order.retain(|cid| cid != id);
        self.channels.remove(id)
    }
}
