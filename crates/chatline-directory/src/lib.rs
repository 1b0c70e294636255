//! Static identity directory backed by a JSON roster file.
//!
//! The roster is read once at startup and never mutated. Lookups are by
//! exact id; search is a case-insensitive substring match on `name` or
//! `username`.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use chatline_types::models::{User, UserId, UserShort};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read roster {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse roster: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate user id {0} in roster")]
    DuplicateId(UserId),
}

pub struct Directory {
    users: Vec<User>,
    by_id: HashMap<UserId, usize>,
}

impl Directory {
    /// Load the roster from a JSON array of user records.
    pub fn open(path: &Path) -> Result<Self, DirectoryError> {
        let raw = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let directory = Self::from_json(&raw)?;
        info!("Loaded {} users from {}", directory.len(), path.display());
        Ok(directory)
    }

    pub fn from_json(raw: &str) -> Result<Self, DirectoryError> {
        let users: Vec<User> = serde_json::from_str(raw)?;
        Self::from_users(users)
    }

    pub fn from_users(users: Vec<User>) -> Result<Self, DirectoryError> {
        let mut by_id = HashMap::with_capacity(users.len());
        for (idx, user) in users.iter().enumerate() {
            if by_id.insert(user.id, idx).is_some() {
                return Err(DirectoryError::DuplicateId(user.id));
            }
        }
        Ok(Self { users, by_id })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn get(&self, id: UserId) -> Option<&User> {
        self.by_id.get(&id).map(|&idx| &self.users[idx])
    }

    pub fn short(&self, id: UserId) -> Option<UserShort> {
        self.get(id).map(User::short)
    }

    /// Resolve ids to short profiles in the given order. Unknown ids are skipped.
    pub fn resolve<I>(&self, ids: I) -> Vec<UserShort>
    where
        I: IntoIterator<Item = UserId>,
    {
        ids.into_iter().filter_map(|id| self.short(id)).collect()
    }

    /// Roster order. An empty or blank query returns everyone.
    pub fn search(&self, query: Option<&str>) -> Vec<UserShort> {
        let needle = query.map(str::trim).unwrap_or_default().to_lowercase();
        self.users
            .iter()
            .filter(|u| {
                needle.is_empty()
                    || u.name.to_lowercase().contains(&needle)
                    || u.username.to_lowercase().contains(&needle)
            })
            .map(User::short)
            .collect()
    }
}
