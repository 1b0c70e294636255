use serde::{Deserialize, Serialize};

use crate::models::{ChannelId, ChannelSummary, Message, UserId, UserShort};

/// Events sent FROM client TO server over the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Bind this connection to a user id
    Identify(UserId),

    #[serde(rename_all = "camelCase")]
    CreateChannel { name: String, creator_id: UserId },

    #[serde(rename_all = "camelCase")]
    JoinChannel { channel_id: ChannelId, user_id: UserId },

    #[serde(rename_all = "camelCase")]
    LeaveChannel { channel_id: ChannelId, user_id: UserId },

    #[serde(rename_all = "camelCase")]
    DeleteChannel { channel_id: ChannelId, user_id: UserId },

    #[serde(rename_all = "camelCase")]
    Message {
        channel_id: ChannelId,
        message: MessageDraft,
    },

    #[serde(rename_all = "camelCase")]
    KickUser {
        channel_id: ChannelId,
        target_id: UserId,
        requester_id: UserId,
    },
}

/// Client-side message body. Clients may send their own `id` and
/// `timestamp`; those fields are not part of the draft and are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDraft {
    pub sender_id: UserId,
    pub text: String,
}

/// Events sent FROM server TO client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Sent once when the connection is accepted
    #[serde(rename_all = "camelCase")]
    Ready { connection_id: String },

    /// Acknowledges an `identify`
    #[serde(rename_all = "camelCase")]
    Identified { user_id: UserId },

    /// Full channel directory after any change to it
    ChannelsUpdated(Vec<ChannelSummary>),

    #[serde(rename_all = "camelCase")]
    ParticipantsUpdated {
        channel_id: ChannelId,
        participants: Vec<UserShort>,
    },

    /// Message log, sent only to a connection that just joined
    #[serde(rename_all = "camelCase")]
    ChannelHistory {
        channel_id: ChannelId,
        messages: Vec<Message>,
    },

    Message(Message),

    #[serde(rename_all = "camelCase")]
    ChannelDeleted { channel_id: ChannelId },

    #[serde(rename_all = "camelCase")]
    Kicked { channel_id: ChannelId },

    /// Creatorship moved after the previous creator left
    #[serde(rename_all = "camelCase")]
    CreatorChanged {
        channel_id: ChannelId,
        creator_id: UserId,
    },

    /// Human-readable failure reason, sent only to the offending connection
    Error(String),
}

impl ServerEvent {
    /// Wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready { .. } => "ready",
            Self::Identified { .. } => "identified",
            Self::ChannelsUpdated(_) => "channels-updated",
            Self::ParticipantsUpdated { .. } => "participants-updated",
            Self::ChannelHistory { .. } => "channel-history",
            Self::Message(_) => "message",
            Self::ChannelDeleted { .. } => "channel-deleted",
            Self::Kicked { .. } => "kicked",
            Self::CreatorChanged { .. } => "creator-changed",
            Self::Error(_) => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identify_takes_a_bare_user_id() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"identify","data":7}"#).unwrap();
        assert_eq!(event, ClientEvent::Identify(7));
    }

    #[test]
    fn message_drops_client_timestamp_and_id() {
        let raw = r#"{"event":"message","data":{"channelId":"chan_1","message":
            {"id":"spoofed","senderId":2,"text":"hi","timestamp":1}}}"#;
        let event: ClientEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(
            event,
            ClientEvent::Message {
                channel_id: "chan_1".into(),
                message: MessageDraft { sender_id: 2, text: "hi".into() },
            }
        );
    }

    #[test]
    fn kick_uses_camel_case_fields() {
        let raw = r#"{"event":"kick-user","data":{"channelId":"c","targetId":2,"requesterId":1}}"#;
        assert!(matches!(
            serde_json::from_str::<ClientEvent>(raw).unwrap(),
            ClientEvent::KickUser { target_id: 2, requester_id: 1, .. }
        ));
    }

    #[test]
    fn missing_fields_are_rejected() {
        let raw = r#"{"event":"join-channel","data":{"channelId":"c"}}"#;
        assert!(serde_json::from_str::<ClientEvent>(raw).is_err());
    }

    #[test]
    fn server_events_are_tagged_by_name() {
        let json = serde_json::to_value(ServerEvent::Kicked { channel_id: "c".into() }).unwrap();
        assert_eq!(json["event"], "kicked");
        assert_eq!(json["data"]["channelId"], "c");

        let json = serde_json::to_value(ServerEvent::Error("No permission".into())).unwrap();
        assert_eq!(json, serde_json::json!({"event": "error", "data": "No permission"}));
    }
}
