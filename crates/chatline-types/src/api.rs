use serde::{Deserialize, Serialize};

use crate::models::UserId;

// -- Users --

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub q: Option<String>,
}

// -- Channels --

/// `userId` is kept raw: anything that is not a positive id means no filter.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelQuery {
    pub user_id: Option<String>,
}

impl ChannelQuery {
    pub fn filter(&self) -> Option<UserId> {
        self.user_id
            .as_deref()
            .and_then(|raw| raw.trim().parse().ok())
            .filter(|&id: &UserId| id != 0)
    }
}


/// Body of every non-2xx REST response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
