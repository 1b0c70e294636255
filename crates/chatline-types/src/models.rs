use serde::{Deserialize, Serialize};

/// Users are identified by the integer id assigned in the roster.
pub type UserId = u64;

/// Channel ids are opaque strings minted by the server.
pub type ChannelId = String;

/// A roster entry. Only `id`, `name`, `username` and `avatar` ever leave the
/// server; everything else in the roster record is kept in `profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(flatten)]
    pub profile: serde_json::Map<String, serde_json::Value>,
}

impl User {
    pub fn short(&self) -> UserShort {
        UserShort {
            id: self.id,
            name: self.name.clone(),
            username: self.username.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Public-safe projection of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserShort {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub avatar: String,
}

/// A chat message as stored in a channel log and broadcast to members.
/// `timestamp` is milliseconds since the Unix epoch, assigned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub channel_id: ChannelId,
    pub sender_id: UserId,
    pub text: String,
    pub timestamp: i64,
}

/// Directory listing entry with participants resolved to short profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSummary {
    pub id: ChannelId,
    pub name: String,
    pub creator_id: UserId,
    pub participants: Vec<UserShort>,
}

/// Full view of one channel, including its message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDetail {
    pub id: ChannelId,
    pub name: String,
    pub creator_id: UserId,
    pub participants: Vec<UserShort>,
    pub messages: Vec<Message>,
}
